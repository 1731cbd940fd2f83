pub mod video_ingest;
