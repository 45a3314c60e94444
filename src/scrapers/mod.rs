pub mod browser;
pub mod padmapper;
pub mod traits;

pub use browser::BrowserSession;
pub use padmapper::{ExtractError, LinkStream, PadmapperScraper};
pub use traits::PageSource;
