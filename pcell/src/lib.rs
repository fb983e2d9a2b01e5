pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod pcell;
pub mod pdk;
pub mod units;

pub mod deps {
    pub use arcstr;
}

pub(crate) mod log;
