pub mod thermal_zone;
