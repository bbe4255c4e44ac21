pub mod content;
pub mod redirects;

pub use content::ContentDao;
pub use redirects::RedirectDao;
