pub mod command;
pub mod config;
pub mod controller;
pub mod drone;
pub mod grid;
pub mod knowledge;
pub mod missile;
pub mod planner;
pub mod simulation;
pub mod stats;
pub mod view;
