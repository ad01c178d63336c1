pub mod bike_table;
pub mod dates;
pub mod weather_table;
