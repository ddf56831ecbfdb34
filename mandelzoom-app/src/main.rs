mod app;
mod config;
mod controller;
mod error;
mod input;
mod platform;
mod selection;
mod worker;

fn main() -> Result<(), error::InitError> {
    app::run()
}
