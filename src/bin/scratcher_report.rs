use anyhow::{Result, anyhow};

use scratcher_terminal::config::{AppConfig, load_dotenv};
use scratcher_terminal::detail::DetailController;
use scratcher_terminal::list::{ListController, ListQuery, ListView};
use scratcher_terminal::page::{PageContext, PageKind};
use scratcher_terminal::report::{render_detail_text, render_list_text};

fn main() -> Result<()> {
    load_dotenv();
    let config = AppConfig::from_env();
    let ctx = PageContext::new(&config.start, config.source.clone());

    match config.start.kind {
        PageKind::List => {
            let controller = ListController::load(ctx);
            let query = ListQuery {
                search: config.search.clone(),
                sort: config.sort,
            };
            let view = controller.view(&query);
            println!("{}", render_list_text(&view));
            if matches!(view, ListView::Error(_)) {
                return Err(anyhow!("list page failed to render"));
            }
        }
        PageKind::Detail => {
            let controller = DetailController::load(ctx);
            println!("{}", render_detail_text(&controller));
            let collisions = controller.slug_collisions();
            if collisions > 0 {
                eprintln!("[WARN] {collisions} other game(s) share this slug; showed the first");
            }
            if let Some(msg) = controller.error_message() {
                return Err(anyhow!(msg));
            }
        }
    }
    Ok(())
}
