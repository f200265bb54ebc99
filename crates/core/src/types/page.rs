use crate::error::CoreError;

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(number: Option<i64>, size: Option<i64>, max_size: u32) -> Result<Self, CoreError> {
        let number = number.unwrap_or(i64::from(DEFAULT_PAGE_NUMBER));
        let size = size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE));
        if number < 1 {
            return Err(CoreError::InvalidPage(format!("page number {number} is below 1")));
        }
        if size < 1 {
            return Err(CoreError::InvalidPage(format!("page size {size} is below 1")));
        }
        if size > i64::from(max_size) {
            return Err(CoreError::InvalidPage(format!(
                "page size {size} exceeds {max_size}"
            )));
        }
        let number = u32::try_from(number)
            .map_err(|_| CoreError::InvalidPage(format!("page number {number} is too large")))?;
        Ok(PageRequest {
            number,
            size: size as u32,
        })
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.number - 1).saturating_mul(u64::from(self.size))
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    pub fn is_next(&self, total: u64, returned: usize) -> bool {
        let returned = u64::try_from(returned).unwrap_or(u64::MAX);
        total > self.skip().saturating_add(returned)
    }
}
