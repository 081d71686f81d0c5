#[derive(Debug)]
pub enum StoreOperation {
    Set(u8, u8),
    Get(u8),
    GetMut(u8, u8),
    Peek(u8),
    PeekMut(u8, u8),
    Has(u8),
    Delete(u8),
    Pop,
    Clear,
    GetOrInsertWith(u8, u8),
    Retain,
    Iter,
}

impl<'a> arbitrary::Arbitrary<'a> for StoreOperation {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        match u.int_in_range(0..=11)? {
            0 => Ok(StoreOperation::Set(u.arbitrary()?, u.arbitrary()?)),
            1 => Ok(StoreOperation::Get(u.arbitrary()?)),
            2 => Ok(StoreOperation::GetMut(u.arbitrary()?, u.arbitrary()?)),
            3 => Ok(StoreOperation::Peek(u.arbitrary()?)),
            4 => Ok(StoreOperation::PeekMut(u.arbitrary()?, u.arbitrary()?)),
            5 => Ok(StoreOperation::Has(u.arbitrary()?)),
            6 => Ok(StoreOperation::Delete(u.arbitrary()?)),
            7 => Ok(StoreOperation::Pop),
            8 => Ok(StoreOperation::Clear),
            9 => Ok(StoreOperation::GetOrInsertWith(
                u.arbitrary()?,
                u.arbitrary()?,
            )),
            10 => Ok(StoreOperation::Retain),
            11 => Ok(StoreOperation::Iter),
            _ => unreachable!(),
        }
    }
}

/// Oldest-first list of entries, updated the way the store should be.
#[derive(Debug, Default)]
pub struct Model {
    pub capacity: usize,
    pub entries: Vec<(u8, u8)>,
}

impl Model {
    pub fn new(capacity: usize) -> Self {
        Model {
            capacity,
            entries: Vec::new(),
        }
    }

    pub fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    pub fn touch(&mut self, key: u8) -> Option<u8> {
        let index = self.position(key)?;
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        Some(entry.1)
    }

    pub fn set(&mut self, key: u8, value: u8) -> Option<(u8, u8)> {
        if self.touch(key).is_some() {
            if let Some(last) = self.entries.last_mut() {
                last.1 = value;
            }
            return None;
        }
        self.entries.push((key, value));
        if self.entries.len() > self.capacity {
            Some(self.entries.remove(0))
        } else {
            None
        }
    }
}
