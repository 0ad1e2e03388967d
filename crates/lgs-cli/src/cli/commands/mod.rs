//! CLI command handlers. Each command lives in its own file.

mod completions;
mod dispense;
mod label;
mod light;
mod login;
mod logout;
mod man;
mod narcotic;
mod pause;
mod receive;
mod redispense;
mod support;
mod update;
mod whoami;

pub use completions::run_completions;
pub use dispense::run_dispense;
pub use label::run_label;
pub use light::{run_light_off, run_light_on};
pub use login::run_login;
pub use logout::run_logout;
pub use man::run_man;
pub use narcotic::run_narcotic;
pub use pause::run_pause;
pub use receive::run_receive;
pub use redispense::run_redispense;
pub use update::run_update;
pub use whoami::run_whoami;
