pub mod capture {
    pub mod domain {
        pub mod capture_source;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod face_candidate;
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod emission {
    pub mod domain {
        pub mod emitter;
        pub mod packet;
    }
    pub mod infrastructure;
}

pub mod preview {
    pub mod domain {
        pub mod preview_renderer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod candidate_filter;
    pub mod detection_pipeline;
    pub mod pipeline_logger;
    pub mod preprocessor;
}

pub mod shared {
    pub mod config;
    pub mod constants;
    pub mod frame;
    pub mod gray_frame;
    pub mod mat_conversion;
}
