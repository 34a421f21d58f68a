pub mod image_probe;
