pub(crate) mod config;
pub(crate) mod controller;
pub(crate) mod driver;
pub(crate) mod media;
pub(crate) mod pointer;
pub(crate) mod typing;
pub(crate) mod visibility;
