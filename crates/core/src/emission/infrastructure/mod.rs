pub mod udp_emitter;
