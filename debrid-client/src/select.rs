use crate::error::{Error, Result};
use crate::models::TorrentFile;

/// Picks the file to stream: the biggest one, the first of them on ties.
pub fn select_file_id(files: &[TorrentFile]) -> Result<u64> {
    if files.is_empty() {
        return Err(Error::NoEligibleFile("empty list of files"));
    }

    let mut file_id = 0;
    let mut size = 0;
    for file in files {
        if *file.bytes() > size {
            size = *file.bytes();
            file_id = *file.id();
        }
    }

    if file_id == 0 {
        return Err(Error::NoEligibleFile("no file ID found"));
    }

    Ok(file_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn first_biggest_file_wins() {
        let files = [
            TorrentFile::new(1, 10),
            TorrentFile::new(2, 50),
            TorrentFile::new(3, 50),
        ];
        assert_eq!(select_file_id(&files).unwrap(), 2);
    }

    #[test]
    fn biggest_file_anywhere_in_list() {
        let files = [
            TorrentFile::new(1, 700),
            TorrentFile::new(2, 3),
            TorrentFile::new(3, 1_400_000_000),
        ];
        assert_eq!(select_file_id(&files).unwrap(), 3);
    }

    #[test]
    fn empty_list() {
        assert_eq!(
            select_file_id(&[]).unwrap_err().kind(),
            ErrorKind::NoEligibleFile
        );
    }

    #[test]
    fn degenerate_entries() {
        let zero_sizes = [TorrentFile::new(1, 0), TorrentFile::new(2, 0)];
        assert_eq!(
            select_file_id(&zero_sizes).unwrap_err().kind(),
            ErrorKind::NoEligibleFile
        );

        let zero_id = [TorrentFile::new(0, 100)];
        assert_eq!(
            select_file_id(&zero_id).unwrap_err().kind(),
            ErrorKind::NoEligibleFile
        );
    }
}
