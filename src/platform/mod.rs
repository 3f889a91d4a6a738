pub mod icon_extractor;
