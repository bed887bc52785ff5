pub mod control_surface;
