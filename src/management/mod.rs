mod batch;

pub use batch::fetch_all;
