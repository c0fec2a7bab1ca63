pub mod opencv_window;
