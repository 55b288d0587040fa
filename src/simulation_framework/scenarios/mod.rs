pub mod legitimate_prefix_only;
pub mod prefix_hijack;
pub mod subprefix_hijack;

pub use legitimate_prefix_only::LegitimatePrefixOnly;
pub use prefix_hijack::PrefixHijack;
pub use subprefix_hijack::SubprefixHijack;
