//! Persistence of pipeline outputs.
//!
//! [`OutputWriter`] writes the four train/test CSV files into an output
//! directory, plus the optional fitted preprocessor and run report:
//!
//! ```text
//! processed_data/
//! ├── X_train.csv
//! ├── X_test.csv
//! ├── y_train.csv
//! ├── y_test.csv
//! ├── preprocessor.json   (save_preprocessor)
//! └── run_report.json     (emit_report)
//! ```

mod writer;

pub use writer::{
    OutputWriter, PREPROCESSOR_FILE, REPORT_FILE, X_TEST_FILE, X_TRAIN_FILE, Y_TEST_FILE,
    Y_TRAIN_FILE, write_csv,
};
