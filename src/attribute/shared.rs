//! Reference-counted external storage.
//!
//! A [`SharedBuffer`] owns its allocation behind an `Arc`, so an attribute
//! wrapping it keeps the memory alive even if every other handle is dropped
//! first: the lifetime is that of the longest holder.

use std::any::Any;
use std::cell::UnsafeCell;
use std::sync::Arc;

struct SharedStorage<T> {
    cell: UnsafeCell<Box<[T]>>,
}

// The cell is only written through an attribute holding exclusive (&mut)
// access to itself; concurrent plain reads are the caller's contract.
unsafe impl<T: Send> Send for SharedStorage<T> {}
unsafe impl<T: Sync> Sync for SharedStorage<T> {}

/// Shared-ownership scalar buffer usable as external attribute storage.
///
/// Cloning is cheap (bumps the reference count); all clones view the same
/// allocation. Writes happen only through an attribute that wrapped the
/// buffer mutably, and must not overlap reads from other handles.
pub struct SharedBuffer<T> {
    inner: Arc<SharedStorage<T>>,
}

impl<T> Clone for SharedBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Copy + Send + Sync + 'static> SharedBuffer<T> {
    /// Take ownership of `values` as the shared allocation.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            inner: Arc::new(SharedStorage {
                cell: UnsafeCell::new(values.into_boxed_slice()),
            }),
        }
    }

    /// Capacity of the allocation, in scalar entries.
    pub fn len(&self) -> usize {
        unsafe { (&(*self.inner.cell.get())).len() }
    }

    /// Whether the allocation is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of handles (buffers and wrapping attributes) sharing the
    /// allocation.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Copy the current contents out.
    pub fn snapshot(&self) -> Vec<T> {
        unsafe { (&(*self.inner.cell.get())).to_vec() }
    }

    pub(crate) fn as_ptr(&self) -> *const T {
        unsafe { (&(*self.inner.cell.get())).as_ptr() }
    }

    pub(crate) fn as_mut_ptr(&self) -> *mut T {
        unsafe { (&mut (*self.inner.cell.get())).as_mut_ptr() }
    }

    /// Type-erased owner handle used by attributes to extend the
    /// allocation's lifetime.
    pub(crate) fn owner(&self) -> Arc<dyn Any + Send + Sync> {
        self.inner.clone()
    }
}

impl<T: Copy + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len())
            .field("holders", &self.holders())
            .finish()
    }
}
