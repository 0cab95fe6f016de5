pub mod logging;
pub mod method_override;
