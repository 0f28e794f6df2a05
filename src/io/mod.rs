mod file_reader;
mod range_reader;
mod retry;
mod s3_reader;

pub use file_reader::FileRangeReader;
pub use range_reader::RangeReader;
pub use retry::{
    RetryPolicy, RetryReader, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES,
};
pub use s3_reader::{create_s3_client, S3RangeReader};
