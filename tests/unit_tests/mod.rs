mod assembly;
mod config;
mod element;
mod mesh;
mod quadrature;
