mod common;

mod batch;
mod properties;
mod queries;
