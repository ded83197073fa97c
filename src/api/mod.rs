pub mod pages;
pub mod rest;
