mod availability;
mod health_check;
mod offices;
mod utils;
