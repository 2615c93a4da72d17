pub mod packet_selector;
