// Adapters layer: concrete implementations of the domain ports (processes, http, host resources).

pub mod http;
pub mod process;
pub mod resources;

pub use http::ReqwestProbe;
pub use process::SystemCommandRunner;
pub use resources::SysinfoProbe;
