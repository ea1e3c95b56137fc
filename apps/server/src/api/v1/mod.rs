pub mod common;
pub mod controllers;
pub mod dto;
pub mod models;
pub mod repositories;
pub mod services;
pub mod views;
