//! Bookings dialog opened from a card's View Bookings button.

use crate::driver::PageDriver;
use crate::regions;
use crate::result::RoomingResult;
use crate::wait::{wait_until, WaitOptions};

/// The bookings dialog
#[derive(Debug)]
pub struct BookingsModal<'a, D: PageDriver> {
    driver: &'a D,
    options: WaitOptions,
}

impl<'a, D: PageDriver> BookingsModal<'a, D> {
    /// Bind the dialog region
    #[must_use]
    pub const fn new(driver: &'a D, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Whether the dialog is on screen
    pub async fn is_open(&self) -> RoomingResult<bool> {
        self.driver.is_visible(&regions::bookings_dialog()).await
    }

    /// Wait for the dialog to appear
    pub async fn wait_until_open(&self) -> RoomingResult<()> {
        let driver = self.driver;
        wait_until("bookings dialog to open", self.options, move || async move {
            driver.is_visible(&regions::bookings_dialog()).await
        })
        .await?;
        Ok(())
    }

    /// Number of booking rows
    pub async fn row_count(&self) -> RoomingResult<usize> {
        self.driver.count(&regions::bookings_rows()).await
    }

    /// Text of every row, in order
    pub async fn rows(&self) -> RoomingResult<Vec<String>> {
        let rows = regions::bookings_rows();
        let mut texts = Vec::new();
        for i in 0..self.driver.count(&rows).await? {
            if let Some(text) = self.driver.text_content(&rows.nth(i)).await? {
                texts.push(text.trim().to_string());
            }
        }
        Ok(texts)
    }

    /// Close the dialog and wait for it to go away
    pub async fn close(&self) -> RoomingResult<()> {
        self.driver
            .click(&regions::bookings_close_button())
            .await?;
        let driver = self.driver;
        wait_until("bookings dialog to close", self.options, move || async move {
            Ok(!driver.is_visible(&regions::bookings_dialog()).await?)
        })
        .await?;
        Ok(())
    }
}
