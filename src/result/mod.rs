pub mod result;

pub use result::ViewResult;
