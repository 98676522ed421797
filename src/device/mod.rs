mod ft600;

pub use ft600::Ft600Model;
