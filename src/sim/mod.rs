pub mod clock;
pub mod event;
pub mod ports;
pub mod scheduler;
pub mod screen;
pub mod session;
pub mod step;
pub mod view;
pub mod world;
