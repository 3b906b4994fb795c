//! repairtimer main entrypoint.

use repairtimer::run;
use repairtimer::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
