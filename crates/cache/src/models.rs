use crate::error::{Error, ErrorKind};
use exn::ResultExt;

/// Location of one piece of content inside a shared blob file.
///
/// `(data_id, offset, length)` is taken on trust from the cache database;
/// checking that the range fits inside the blob is the blob reader's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheRef {
    pub uuid: String,
    /// Identifier of the blob file (`fs/<data_id>`) holding the bytes.
    pub data_id: i64,
    pub offset: u64,
    pub length: u64,
}
impl CacheRef {
    /// Exclusive end of the byte range, if it does not overflow.
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.length)
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RefRow {
    uuid: String,
    data_id: i64,
    offset: i64,
    length: i64,
}
impl TryFrom<RefRow> for CacheRef {
    type Error = Error;
    fn try_from(row: RefRow) -> Result<Self, Self::Error> {
        Ok(Self {
            uuid: row.uuid,
            data_id: row.data_id,
            offset: u64::try_from(row.offset).or_raise(|| ErrorKind::InvalidData("offset"))?,
            length: u64::try_from(row.length).or_raise(|| ErrorKind::InvalidData("length"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_model() {
        let row = RefRow { uuid: "lsAbCdEfGh".to_string(), data_id: 3, offset: 1024, length: 256 };
        let model = CacheRef::try_from(row).unwrap();
        assert_eq!(model.data_id, 3);
        assert_eq!(model.end(), Some(1280));
    }

    #[test]
    fn test_negative_range_is_invalid() {
        let row = RefRow { uuid: "lc0123456789".to_string(), data_id: 1, offset: -1, length: 10 };
        let err = CacheRef::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("offset")));
    }
}
