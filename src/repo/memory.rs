use super::{Entity, Repository, StoreError};
use crate::records::{AttendanceRecord, AttendanceSession, Instructor, Notice, Student};

/// In-process collections, one per record kind.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub students: Vec<Student>,
    pub instructors: Vec<Instructor>,
    pub attendance: Vec<AttendanceRecord>,
    pub sessions: Vec<AttendanceSession>,
    pub notices: Vec<Notice>,
}

macro_rules! memory_entity {
    ($ty:ty, $field:ident) => {
        impl Entity for $ty {
            fn bucket(store: &MemoryStore) -> &Vec<Self> {
                &store.$field
            }

            fn bucket_mut(store: &mut MemoryStore) -> &mut Vec<Self> {
                &mut store.$field
            }
        }
    };
}

memory_entity!(Student, students);
memory_entity!(Instructor, instructors);
memory_entity!(AttendanceRecord, attendance);
memory_entity!(AttendanceSession, sessions);
memory_entity!(Notice, notices);

pub struct MemoryRepository<'a> {
    store: &'a mut MemoryStore,
}

impl<'a> MemoryRepository<'a> {
    pub fn new(store: &'a mut MemoryStore) -> Self {
        Self { store }
    }
}

impl<R: Entity> Repository<R> for MemoryRepository<'_> {
    fn list(&self) -> Result<Vec<R>, StoreError> {
        Ok(R::bucket(self.store).clone())
    }

    fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        Ok(R::bucket(self.store).iter().find(|r| r.id() == id).cloned())
    }

    fn insert(&mut self, record: R) -> Result<(), StoreError> {
        let bucket = R::bucket_mut(self.store);
        if bucket.iter().any(|r| r.id() == record.id()) {
            return Err(StoreError::DuplicateId(record.id().to_string()));
        }
        bucket.push(record);
        Ok(())
    }

    fn update(&mut self, record: R) -> Result<(), StoreError> {
        let bucket = R::bucket_mut(self.store);
        match bucket.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::NotFound(record.id().to_string())),
        }
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let bucket = R::bucket_mut(self.store);
        let before = bucket.len();
        bucket.retain(|r| r.id() != id);
        Ok(bucket.len() != before)
    }
}
