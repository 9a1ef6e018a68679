//! The typed attribute buffer.
//!
//! An [`Attribute`] stores `num_elements` logical rows of `num_channels`
//! scalar values each. The backing storage is either owned by the attribute
//! (a growable internal buffer) or a view into caller-owned memory, wrapped
//! mutably, read-only, or through a shared-ownership handle. Every mutation
//! of an external buffer passes through the growth/shrink/write policy
//! checks, which may fail the operation or transparently convert the buffer
//! to an internal copy.

use std::any::Any;
use std::sync::Arc;

use tracing::warn;

use crate::error::{AttribError, Result};
use crate::scalar::Scalar;

use super::policies::{
    AttributeElement, AttributeUsage, CastPolicy, CopyPolicy, GrowthPolicy, ShrinkPolicy,
    WritePolicy,
};
use super::shared::SharedBuffer;

/// Storage backing an attribute buffer. Each variant carries exactly the
/// state its ownership mode needs; the presence of `owner` on the external
/// variants marks shared ownership (the allocation outlives the attribute).
enum Storage<T> {
    /// Growable buffer owned by the attribute. Length is always exactly
    /// `num_elements * num_channels`; padding lives in the vector capacity.
    Owned(Vec<T>),
    /// Mutable view into caller-owned memory. `capacity` is the length
    /// declared at wrap time.
    External {
        ptr: *mut T,
        capacity: usize,
        owner: Option<Arc<dyn Any + Send + Sync>>,
    },
    /// Read-only view into caller-owned memory.
    ExternalConst {
        ptr: *const T,
        capacity: usize,
        owner: Option<Arc<dyn Any + Send + Sync>>,
    },
}

/// A typed data channel attached to a mesh element kind.
pub struct Attribute<T: Scalar> {
    element: AttributeElement,
    usage: AttributeUsage,
    num_channels: usize,
    num_elements: usize,
    default_value: T,
    growth_policy: GrowthPolicy,
    shrink_policy: ShrinkPolicy,
    write_policy: WritePolicy,
    copy_policy: CopyPolicy,
    cast_policy: CastPolicy,
    storage: Storage<T>,
}

// Read accessors touch no interior caches, so shared references are safe to
// send across threads; every policy transition requires `&mut self`. For
// externally wrapped memory the wrap-time contract extends to other threads.
unsafe impl<T: Scalar> Send for Attribute<T> {}
unsafe impl<T: Scalar> Sync for Attribute<T> {}

impl<T: Scalar> Attribute<T> {
    /// Create an empty internal attribute.
    ///
    /// Fails if `num_channels` is incompatible with `usage`, or if `usage`
    /// is an index usage and `T` is not integral.
    pub fn new(
        element: AttributeElement,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<Self> {
        usage.validate_channels(num_channels)?;
        usage.validate_scalar(T::TAG)?;
        Ok(Self {
            element,
            usage,
            num_channels,
            num_elements: 0,
            default_value: T::ZERO,
            growth_policy: GrowthPolicy::default(),
            shrink_policy: ShrinkPolicy::default(),
            write_policy: WritePolicy::default(),
            copy_policy: CopyPolicy::default(),
            cast_policy: CastPolicy::default(),
            storage: Storage::Owned(Vec::new()),
        })
    }

    /// Create an internal attribute that adopts `data` without copying. The
    /// buffer length must be a multiple of the channel count.
    pub fn from_vec(
        element: AttributeElement,
        usage: AttributeUsage,
        num_channels: usize,
        data: Vec<T>,
    ) -> Result<Self> {
        let mut attr = Self::new(element, usage, num_channels)?;
        if data.len() % num_channels != 0 {
            return Err(AttribError::Shape(format!(
                "buffer of {} values is not a multiple of {} channels",
                data.len(),
                num_channels
            )));
        }
        attr.num_elements = data.len() / num_channels;
        attr.storage = Storage::Owned(data);
        Ok(attr)
    }

    /// Element kind the attribute is attached to.
    pub fn element(&self) -> AttributeElement {
        self.element
    }

    /// Semantic usage tag.
    pub fn usage(&self) -> AttributeUsage {
        self.usage
    }

    /// Number of channels per element (fixed at construction).
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Current logical number of elements.
    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    /// Whether the attribute holds no elements.
    pub fn is_empty(&self) -> bool {
        self.num_elements == 0
    }

    /// Whether the buffer is a view into caller-owned memory.
    pub fn is_external(&self) -> bool {
        !matches!(self.storage, Storage::Owned(_))
    }

    /// Whether the buffer is external and was wrapped read-only. Always
    /// false for internal buffers.
    pub fn is_read_only(&self) -> bool {
        matches!(self.storage, Storage::ExternalConst { .. })
    }

    /// Whether the backing memory's lifetime is managed: internal, or
    /// external through a shared-ownership handle.
    pub fn is_managed(&self) -> bool {
        match &self.storage {
            Storage::Owned(_) => true,
            Storage::External { owner, .. } | Storage::ExternalConst { owner, .. } => {
                owner.is_some()
            }
        }
    }

    /// Backing capacity in scalar entries (declared capacity for external
    /// buffers, vector capacity for internal ones).
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Owned(data) => data.capacity(),
            Storage::External { capacity, .. } | Storage::ExternalConst { capacity, .. } => {
                *capacity
            }
        }
    }

    /// Address of the first scalar entry. Useful to verify whether an
    /// operation moved the data.
    pub fn data_ptr(&self) -> *const T {
        match &self.storage {
            Storage::Owned(data) => data.as_ptr(),
            Storage::External { ptr, .. } => *ptr as *const T,
            Storage::ExternalConst { ptr, .. } => *ptr,
        }
    }

    /// Default value broadcast into newly grown entries.
    pub fn default_value(&self) -> T {
        self.default_value
    }

    /// Set the default value used when the attribute grows.
    pub fn set_default_value(&mut self, value: T) {
        self.default_value = value;
    }

    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth_policy
    }

    pub fn set_growth_policy(&mut self, policy: GrowthPolicy) {
        self.growth_policy = policy;
    }

    pub fn shrink_policy(&self) -> ShrinkPolicy {
        self.shrink_policy
    }

    pub fn set_shrink_policy(&mut self, policy: ShrinkPolicy) {
        self.shrink_policy = policy;
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn set_write_policy(&mut self, policy: WritePolicy) {
        self.write_policy = policy;
    }

    pub fn copy_policy(&self) -> CopyPolicy {
        self.copy_policy
    }

    pub fn set_copy_policy(&mut self, policy: CopyPolicy) {
        self.copy_policy = policy;
    }

    pub fn cast_policy(&self) -> CastPolicy {
        self.cast_policy
    }

    pub fn set_cast_policy(&mut self, policy: CastPolicy) {
        self.cast_policy = policy;
    }

    // ---------------------------------------------------------------------
    // Wrapping external buffers
    // ---------------------------------------------------------------------

    /// Wrap an external mutable buffer as storage, discarding any data the
    /// attribute previously held. The buffer length is the declared
    /// capacity; excess over `num_elements * num_channels` becomes padding
    /// available to [`GrowthPolicy::AllowWithinCapacity`].
    ///
    /// # Safety
    ///
    /// The buffer must outlive the attribute (or its next re-wrap /
    /// conversion to an internal copy), and must not be read or written
    /// through any other path while the attribute can write to it.
    pub unsafe fn wrap(&mut self, buffer: &mut [T], num_elements: usize) -> Result<()> {
        self.check_wrap_size(buffer.len(), num_elements)?;
        self.storage = Storage::External {
            ptr: buffer.as_mut_ptr(),
            capacity: buffer.len(),
            owner: None,
        };
        self.num_elements = num_elements;
        Ok(())
    }

    /// Wrap an external read-only buffer. Any later write attempt goes
    /// through the write policy.
    ///
    /// # Safety
    ///
    /// The buffer must outlive the attribute (or its next re-wrap /
    /// conversion to an internal copy).
    pub unsafe fn wrap_const(&mut self, buffer: &[T], num_elements: usize) -> Result<()> {
        self.check_wrap_size(buffer.len(), num_elements)?;
        self.storage = Storage::ExternalConst {
            ptr: buffer.as_ptr(),
            capacity: buffer.len(),
            owner: None,
        };
        self.num_elements = num_elements;
        Ok(())
    }

    /// Wrap a shared-ownership buffer mutably. The attribute keeps the
    /// allocation alive for as long as it references it.
    pub fn wrap_shared(&mut self, buffer: SharedBuffer<T>, num_elements: usize) -> Result<()> {
        self.check_wrap_size(buffer.len(), num_elements)?;
        self.storage = Storage::External {
            ptr: buffer.as_mut_ptr(),
            capacity: buffer.len(),
            owner: Some(buffer.owner()),
        };
        self.num_elements = num_elements;
        Ok(())
    }

    /// Wrap a shared-ownership buffer read-only.
    pub fn wrap_shared_const(
        &mut self,
        buffer: SharedBuffer<T>,
        num_elements: usize,
    ) -> Result<()> {
        self.check_wrap_size(buffer.len(), num_elements)?;
        self.storage = Storage::ExternalConst {
            ptr: buffer.as_ptr(),
            capacity: buffer.len(),
            owner: Some(buffer.owner()),
        };
        self.num_elements = num_elements;
        Ok(())
    }

    fn check_wrap_size(&self, buffer_len: usize, num_elements: usize) -> Result<()> {
        if num_elements * self.num_channels > buffer_len {
            return Err(AttribError::Shape(format!(
                "buffer of {} entries cannot hold {} x {} values",
                buffer_len, num_elements, self.num_channels
            )));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Growth and shrink
    // ---------------------------------------------------------------------

    /// Copy the data into an internally-owned buffer (preserving the padded
    /// capacity) and switch to internal mode. The buffer must currently be
    /// external. Use before longer-term storage to decouple from
    /// caller-owned memory.
    pub fn create_internal_copy(&mut self) -> Result<()> {
        if !self.is_external() {
            return Err(AttribError::Construction(
                "create_internal_copy requires an external buffer".into(),
            ));
        }
        let capacity = self.capacity();
        let logical = self.num_elements * self.num_channels;
        let mut data = Vec::with_capacity(capacity);
        data.extend_from_slice(&self.full_view()[..logical]);
        self.storage = Storage::Owned(data);
        Ok(())
    }

    /// Set the number of elements to zero. For an external buffer this is a
    /// shrink-to-zero and is governed by the shrink policy.
    pub fn clear(&mut self) -> Result<()> {
        if self.is_external() && self.num_elements != 0 {
            self.shrink_check()?;
        }
        if let Storage::Owned(data) = &mut self.storage {
            data.clear();
        }
        self.num_elements = 0;
        Ok(())
    }

    /// Drop padding capacity. For an external buffer with padding this
    /// creates an internal copy sized exactly to the logical content; it
    /// always succeeds regardless of the shrink policy, since only padding
    /// is dropped (deliberate asymmetry with [`Attribute::clear`]).
    pub fn shrink_to_fit(&mut self) {
        let logical = self.num_elements * self.num_channels;
        if self.is_external() {
            if self.capacity() == logical {
                return;
            }
            let data = self.full_view()[..logical].to_vec();
            self.storage = Storage::Owned(data);
        } else if let Storage::Owned(data) = &mut self.storage {
            data.shrink_to_fit();
        }
    }

    /// Ensure the backing capacity holds at least `new_cap` scalar entries.
    /// The capacity need not be a multiple of the channel count. For
    /// external buffers a request beyond the declared capacity fails or
    /// converts to an internal copy, as the growth policy directs.
    pub fn reserve_entries(&mut self, new_cap: usize) -> Result<()> {
        if self.is_external() && new_cap > self.capacity() {
            match self.growth_policy {
                GrowthPolicy::ErrorIfExternal | GrowthPolicy::AllowWithinCapacity => {
                    return Err(self.capacity_error(new_cap));
                }
                GrowthPolicy::WarnAndCopy => {
                    warn!(
                        requested = new_cap,
                        capacity = self.capacity(),
                        "growing an attribute pointing to external data; creating an internal copy"
                    );
                    self.create_internal_copy()?;
                }
                GrowthPolicy::SilentCopy => self.create_internal_copy()?,
            }
        }
        if let Storage::Owned(data) = &mut self.storage {
            if new_cap > data.capacity() {
                data.reserve(new_cap - data.len());
            }
        }
        Ok(())
    }

    /// Resize to `num_elements` elements. New rows are filled with the
    /// default value broadcast across all channels. Growth and shrink are
    /// gated by the respective policies for external buffers.
    pub fn resize_elements(&mut self, num_elements: usize) -> Result<()> {
        let channels = self.num_channels;
        let new_len = num_elements * channels;
        if num_elements > self.num_elements {
            self.growth_check(new_len)?;
            if self.is_external() {
                self.write_check()?;
            }
        } else if num_elements < self.num_elements {
            self.shrink_check()?;
        } else {
            return Ok(());
        }
        let default = self.default_value;
        let old_len = self.num_elements * channels;
        match &mut self.storage {
            Storage::Owned(data) => data.resize(new_len, default),
            Storage::External { ptr, capacity, .. } => {
                if new_len > old_len {
                    let view = unsafe { std::slice::from_raw_parts_mut(*ptr, *capacity) };
                    view[old_len..new_len].fill(default);
                }
            }
            // Growth on a read-only buffer was either rejected or converted
            // above; only in-place truncation reaches this arm.
            Storage::ExternalConst { .. } => debug_assert!(new_len <= old_len),
        }
        self.num_elements = num_elements;
        Ok(())
    }

    /// Append rows copied from `values`. The slice length must be a
    /// multiple of the channel count.
    pub fn insert_elements(&mut self, values: &[T]) -> Result<()> {
        let channels = self.num_channels;
        if values.len() % channels != 0 {
            return Err(AttribError::Shape(format!(
                "span of {} values is not a multiple of {} channels",
                values.len(),
                channels
            )));
        }
        if values.is_empty() {
            return Ok(());
        }
        let old_len = self.num_elements * channels;
        self.growth_check(old_len + values.len())?;
        if self.is_external() {
            self.write_check()?;
        }
        match &mut self.storage {
            Storage::Owned(data) => data.extend_from_slice(values),
            Storage::External { ptr, capacity, .. } => {
                let view = unsafe { std::slice::from_raw_parts_mut(*ptr, *capacity) };
                view[old_len..old_len + values.len()].copy_from_slice(values);
            }
            Storage::ExternalConst { .. } => {
                unreachable!("write check rejects or converts read-only buffers")
            }
        }
        self.num_elements += values.len() / channels;
        Ok(())
    }

    /// Append `count` default-valued rows. Use
    /// [`Attribute::set_default_value`] for a non-zero fill.
    pub fn insert_default_elements(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let channels = self.num_channels;
        let old_len = self.num_elements * channels;
        let added = count * channels;
        self.growth_check(old_len + added)?;
        if self.is_external() {
            self.write_check()?;
        }
        let default = self.default_value;
        match &mut self.storage {
            Storage::Owned(data) => data.resize(old_len + added, default),
            Storage::External { ptr, capacity, .. } => {
                let view = unsafe { std::slice::from_raw_parts_mut(*ptr, *capacity) };
                view[old_len..old_len + added].fill(default);
            }
            Storage::ExternalConst { .. } => {
                unreachable!("write check rejects or converts read-only buffers")
            }
        }
        self.num_elements += count;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------------

    /// Value of a single-channel element.
    ///
    /// # Panics
    ///
    /// Panics if the attribute has more than one channel or `i` is out of
    /// bounds.
    pub fn get(&self, i: usize) -> T {
        assert_eq!(
            self.num_channels, 1,
            "scalar access requires a single-channel attribute"
        );
        self.get_all()[i]
    }

    /// Value of element `i` at channel `c`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `c` is out of bounds.
    pub fn get_at(&self, i: usize, c: usize) -> T {
        assert!(c < self.num_channels, "channel {c} out of bounds");
        self.get_all()[i * self.num_channels + c]
    }

    /// Writable reference to a single-channel element. Runs the write
    /// policy first.
    pub fn ref_value(&mut self, i: usize) -> Result<&mut T> {
        if self.num_channels != 1 {
            return Err(AttribError::Shape(
                "scalar access requires a single-channel attribute".into(),
            ));
        }
        Ok(&mut self.ref_all()?[i])
    }

    /// Writable reference to element `i` at channel `c`. Runs the write
    /// policy first.
    pub fn ref_value_at(&mut self, i: usize, c: usize) -> Result<&mut T> {
        if c >= self.num_channels {
            return Err(AttribError::Shape(format!(
                "channel {c} out of bounds for {} channels",
                self.num_channels
            )));
        }
        let channels = self.num_channels;
        Ok(&mut self.ref_all()?[i * channels + c])
    }

    /// Read-only view of exactly `num_elements * num_channels` entries (the
    /// padded capacity is never exposed).
    pub fn get_all(&self) -> &[T] {
        &self.full_view()[..self.num_elements * self.num_channels]
    }

    /// Writable view of exactly `num_elements * num_channels` entries. Runs
    /// the write policy first.
    pub fn ref_all(&mut self) -> Result<&mut [T]> {
        self.write_check()?;
        let logical = self.num_elements * self.num_channels;
        Ok(&mut self.full_view_mut()[..logical])
    }

    /// Read-only view of the first `num_elements` rows.
    pub fn get_first(&self, num_elements: usize) -> &[T] {
        &self.get_all()[..num_elements * self.num_channels]
    }

    /// Writable view of the first `num_elements` rows.
    pub fn ref_first(&mut self, num_elements: usize) -> Result<&mut [T]> {
        let n = num_elements * self.num_channels;
        Ok(&mut self.ref_all()?[..n])
    }

    /// Read-only view of the last `num_elements` rows.
    pub fn get_last(&self, num_elements: usize) -> &[T] {
        let all = self.get_all();
        &all[all.len() - num_elements * self.num_channels..]
    }

    /// Writable view of the last `num_elements` rows.
    pub fn ref_last(&mut self, num_elements: usize) -> Result<&mut [T]> {
        let n = num_elements * self.num_channels;
        let all = self.ref_all()?;
        let len = all.len();
        Ok(&mut all[len - n..])
    }

    /// Read-only view of `num_elements` rows starting at `first_element`.
    pub fn get_middle(&self, first_element: usize, num_elements: usize) -> &[T] {
        let start = first_element * self.num_channels;
        &self.get_all()[start..start + num_elements * self.num_channels]
    }

    /// Writable view of `num_elements` rows starting at `first_element`.
    pub fn ref_middle(&mut self, first_element: usize, num_elements: usize) -> Result<&mut [T]> {
        let start = first_element * self.num_channels;
        let n = num_elements * self.num_channels;
        Ok(&mut self.ref_all()?[start..start + n])
    }

    /// Read-only view of the `num_channels` entries of one row.
    pub fn get_row(&self, element: usize) -> &[T] {
        self.get_middle(element, 1)
    }

    /// Writable view of the `num_channels` entries of one row.
    pub fn ref_row(&mut self, element: usize) -> Result<&mut [T]> {
        self.ref_middle(element, 1)
    }

    // ---------------------------------------------------------------------
    // Move / copy
    // ---------------------------------------------------------------------

    /// Move the buffer contents out, leaving this attribute as a valid
    /// empty internal buffer with the same shape and policies. The returned
    /// attribute keeps the original data pointer (internal or external).
    pub fn take(&mut self) -> Self {
        let storage = std::mem::replace(&mut self.storage, Storage::Owned(Vec::new()));
        let num_elements = std::mem::take(&mut self.num_elements);
        Self {
            element: self.element,
            usage: self.usage,
            num_channels: self.num_channels,
            num_elements,
            default_value: self.default_value,
            growth_policy: self.growth_policy,
            shrink_policy: self.shrink_policy,
            write_policy: self.write_policy,
            copy_policy: self.copy_policy,
            cast_policy: self.cast_policy,
            storage,
        }
    }

    /// Clone the attribute, honoring the copy policy for external buffers:
    /// deep-copy, alias the external pointer, or fail.
    pub fn try_clone(&self) -> Result<Self> {
        let storage = match &self.storage {
            Storage::Owned(data) => Storage::Owned(data.clone()),
            Storage::External { ptr, capacity, owner } => match self.copy_policy {
                CopyPolicy::CopyIfExternal => Storage::Owned(self.copy_logical_with_capacity()),
                CopyPolicy::KeepExternalPtr => Storage::External {
                    ptr: *ptr,
                    capacity: *capacity,
                    owner: owner.clone(),
                },
                CopyPolicy::ErrorIfExternal => {
                    return Err(AttribError::Capacity(
                        "attribute copy policy prevents copying an external buffer".into(),
                    ));
                }
            },
            Storage::ExternalConst { ptr, capacity, owner } => match self.copy_policy {
                CopyPolicy::CopyIfExternal => Storage::Owned(self.copy_logical_with_capacity()),
                CopyPolicy::KeepExternalPtr => Storage::ExternalConst {
                    ptr: *ptr,
                    capacity: *capacity,
                    owner: owner.clone(),
                },
                CopyPolicy::ErrorIfExternal => {
                    return Err(AttribError::Capacity(
                        "attribute copy policy prevents copying an external buffer".into(),
                    ));
                }
            },
        };
        Ok(Self {
            element: self.element,
            usage: self.usage,
            num_channels: self.num_channels,
            num_elements: self.num_elements,
            default_value: self.default_value,
            growth_policy: self.growth_policy,
            shrink_policy: self.shrink_policy,
            write_policy: self.write_policy,
            copy_policy: self.copy_policy,
            cast_policy: self.cast_policy,
            storage,
        })
    }

    fn copy_logical_with_capacity(&self) -> Vec<T> {
        let mut data = Vec::with_capacity(self.capacity());
        data.extend_from_slice(self.get_all());
        data
    }

    // ---------------------------------------------------------------------
    // Policy checks (the single shared helpers every gated entry point uses)
    // ---------------------------------------------------------------------

    /// Gate a growth request to `new_cap` scalar entries. No-op for
    /// internal buffers and for unchanged sizes; otherwise the growth
    /// policy decides between failing and converting to an internal copy.
    fn growth_check(&mut self, new_cap: usize) -> Result<()> {
        if !self.is_external() {
            return Ok(());
        }
        if new_cap == self.num_elements * self.num_channels {
            return Ok(());
        }
        match self.growth_policy {
            GrowthPolicy::ErrorIfExternal => Err(AttribError::Capacity(
                "attribute policy prevents growing an external buffer".into(),
            )),
            GrowthPolicy::AllowWithinCapacity => {
                if new_cap > self.capacity() {
                    Err(self.capacity_error(new_cap))
                } else {
                    Ok(())
                }
            }
            GrowthPolicy::WarnAndCopy => {
                if new_cap > self.capacity() {
                    warn!(
                        requested = new_cap,
                        capacity = self.capacity(),
                        "growing an attribute pointing to external data; creating an internal copy"
                    );
                    self.create_internal_copy()
                } else {
                    Ok(())
                }
            }
            GrowthPolicy::SilentCopy => {
                if new_cap > self.capacity() {
                    self.create_internal_copy()
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Gate a shrink request on an external buffer.
    fn shrink_check(&mut self) -> Result<()> {
        if !self.is_external() {
            return Ok(());
        }
        match self.shrink_policy {
            ShrinkPolicy::ErrorIfExternal => Err(AttribError::Capacity(
                "attribute policy prevents shrinking an external buffer".into(),
            )),
            ShrinkPolicy::IgnoreIfExternal => Ok(()),
            ShrinkPolicy::WarnAndCopy => {
                warn!(
                    "shrinking an attribute pointing to external data; creating an internal copy"
                );
                self.create_internal_copy()
            }
            ShrinkPolicy::SilentCopy => self.create_internal_copy(),
        }
    }

    /// Gate write access to a read-only buffer. May convert to an internal
    /// copy; reads never enter this check.
    fn write_check(&mut self) -> Result<()> {
        if !self.is_read_only() {
            return Ok(());
        }
        match self.write_policy {
            WritePolicy::ErrorIfReadOnly => Err(AttribError::ReadOnly(
                "attribute policy prevents writing to a read-only buffer".into(),
            )),
            WritePolicy::WarnAndCopy => {
                warn!(
                    "write access to an attribute pointing to read-only data; creating an internal copy"
                );
                self.create_internal_copy()
            }
            WritePolicy::SilentCopy => self.create_internal_copy(),
        }
    }

    fn capacity_error(&self, new_cap: usize) -> AttribError {
        AttribError::Capacity(format!(
            "attribute policy prevents growing an external buffer beyond capacity ({} / {})",
            new_cap,
            self.capacity()
        ))
    }

    /// Full backing view including padding (external) or exactly the
    /// logical entries (internal).
    fn full_view(&self) -> &[T] {
        match &self.storage {
            Storage::Owned(data) => data.as_slice(),
            Storage::External { ptr, capacity, .. } => unsafe {
                std::slice::from_raw_parts(*ptr as *const T, *capacity)
            },
            Storage::ExternalConst { ptr, capacity, .. } => unsafe {
                std::slice::from_raw_parts(*ptr, *capacity)
            },
        }
    }

    fn full_view_mut(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Owned(data) => data.as_mut_slice(),
            Storage::External { ptr, capacity, .. } => unsafe {
                std::slice::from_raw_parts_mut(*ptr, *capacity)
            },
            Storage::ExternalConst { .. } => {
                unreachable!("write check rejects or converts read-only buffers")
            }
        }
    }
}

impl<T: Scalar> Clone for Attribute<T> {
    /// Delegates to [`Attribute::try_clone`].
    ///
    /// # Panics
    ///
    /// Panics if the copy policy is [`CopyPolicy::ErrorIfExternal`] and the
    /// buffer is external; use `try_clone` to handle that case.
    fn clone(&self) -> Self {
        self.try_clone()
            .expect("attribute copy policy forbids cloning an external buffer")
    }
}

impl<T: Scalar> std::fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("element", &self.element)
            .field("usage", &self.usage)
            .field("num_channels", &self.num_channels)
            .field("num_elements", &self.num_elements)
            .field("external", &self.is_external())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iota(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    #[test]
    fn construction_validates_usage() {
        assert!(Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Scalar, 2).is_err());
        assert!(Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::UV, 1).is_err());
        assert!(Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Color, 5).is_err());
        assert!(
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::VertexIndex, 1)
                .is_err()
        );
        assert!(
            Attribute::<i32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).is_ok()
        );
        assert!(
            Attribute::<u32>::new(AttributeElement::Corner, AttributeUsage::VertexIndex, 1).is_ok()
        );
    }

    #[test]
    fn resize_fills_with_default() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        attr.set_default_value(2.5);
        attr.resize_elements(4).unwrap();
        assert_eq!(attr.num_elements(), 4);
        assert_eq!(attr.get_all(), &[2.5f32; 12][..]);
    }

    #[test]
    fn insert_then_read_back() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        attr.insert_elements(&iota(30)).unwrap();
        assert_eq!(attr.num_elements(), 10);
        for i in 0..10 {
            for c in 0..3 {
                assert_eq!(attr.get_at(i, c), (i * 3 + c) as f32);
            }
        }
        assert_eq!(attr.get_row(2), &[6.0, 7.0, 8.0]);
        assert_eq!(attr.get_first(1), &[0.0, 1.0, 2.0]);
        assert_eq!(attr.get_last(1), &[27.0, 28.0, 29.0]);
        assert_eq!(attr.get_middle(4, 2), &iota(30)[12..18]);
    }

    #[test]
    fn insert_rejects_partial_rows() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let err = attr.insert_elements(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, AttribError::Shape(_)));
        assert_eq!(attr.num_elements(), 0);
    }

    #[test]
    fn scalar_access_requires_one_channel() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        attr.resize_elements(2).unwrap();
        assert!(attr.ref_value(0).is_err());

        let mut scalar =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Scalar, 1).unwrap();
        scalar.insert_elements(&[4.0, 5.0]).unwrap();
        assert_eq!(scalar.get(1), 5.0);
        *scalar.ref_value(1).unwrap() = 9.0;
        assert_eq!(scalar.get(1), 9.0);
    }

    #[test]
    fn wrap_respects_declared_capacity() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let mut buffer = iota(27);
        unsafe {
            assert!(attr.wrap(&mut buffer[..], 10).is_err()); // 30 > 27
            attr.wrap(&mut buffer[..], 5).unwrap();
        }
        assert!(attr.is_external());
        assert!(!attr.is_read_only());
        assert!(!attr.is_managed());
        assert_eq!(attr.num_elements(), 5);
        assert_eq!(attr.capacity(), 27);
        assert_eq!(attr.get_all().len(), 15);
    }

    #[test]
    fn growth_within_capacity_stays_in_place() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let mut buffer = iota(27);
        unsafe { attr.wrap(&mut buffer[..], 5).unwrap() };
        attr.set_growth_policy(GrowthPolicy::AllowWithinCapacity);
        let ptr = attr.data_ptr();

        attr.insert_default_elements(4).unwrap();
        assert_eq!(attr.num_elements(), 9);
        assert_eq!(attr.data_ptr(), ptr);
        // Old values preserved, new rows default-filled
        assert_eq!(&attr.get_all()[..15], &iota(15)[..]);
        assert_eq!(&attr.get_all()[15..], &[0.0f32; 12][..]);

        let err = attr.insert_default_elements(1).unwrap_err();
        assert!(matches!(err, AttribError::Capacity(_)));
        assert_eq!(attr.num_elements(), 9);
    }

    #[test]
    fn growth_beyond_capacity_copies_under_silent_copy() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let mut buffer = iota(15);
        unsafe { attr.wrap(&mut buffer[..], 5).unwrap() };
        attr.set_growth_policy(GrowthPolicy::SilentCopy);
        let ptr = attr.data_ptr();

        attr.insert_elements(&[100.0, 101.0, 102.0]).unwrap();
        assert_ne!(attr.data_ptr(), ptr);
        assert!(!attr.is_external());
        assert_eq!(attr.num_elements(), 6);
        assert_eq!(attr.get_row(5), &[100.0, 101.0, 102.0]);
        // Caller memory untouched
        assert_eq!(buffer, iota(15));
    }

    #[test]
    fn read_only_wrap_gates_writes() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let buffer = iota(15);
        unsafe { attr.wrap_const(&buffer[..], 5).unwrap() };
        assert!(attr.is_read_only());

        // Reads always succeed
        assert_eq!(attr.get_at(0, 1), 1.0);
        // Writes fail under the default policy
        assert!(matches!(attr.ref_all(), Err(AttribError::ReadOnly(_))));

        attr.set_write_policy(WritePolicy::SilentCopy);
        let ptr_before = attr.data_ptr();
        attr.ref_all().unwrap()[0] = 42.0;
        assert_ne!(attr.data_ptr(), ptr_before);
        assert!(!attr.is_read_only());
        assert_eq!(attr.get_at(0, 0), 42.0);
        assert_eq!(buffer[0], 0.0);
    }

    #[test]
    fn clear_is_shrink_policy_gated() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let mut buffer = iota(15);
        unsafe { attr.wrap(&mut buffer[..], 5).unwrap() };

        assert!(matches!(attr.clear(), Err(AttribError::Capacity(_))));
        assert_eq!(attr.num_elements(), 5);

        attr.set_shrink_policy(ShrinkPolicy::IgnoreIfExternal);
        attr.clear().unwrap();
        assert_eq!(attr.num_elements(), 0);
        assert!(attr.is_external());
    }

    #[test]
    fn shrink_to_fit_always_succeeds() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let mut buffer = iota(27);
        unsafe { attr.wrap(&mut buffer[..], 5).unwrap() };
        // Default shrink policy would reject a shrink, but dropping padding
        // is not policy-gated.
        attr.shrink_to_fit();
        assert!(!attr.is_external());
        assert_eq!(attr.num_elements(), 5);
        assert_eq!(attr.get_all(), &iota(15)[..]);
    }

    #[test]
    fn take_leaves_valid_empty_source() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        attr.insert_elements(&iota(9)).unwrap();
        let ptr = attr.data_ptr();

        let moved = attr.take();
        assert_eq!(moved.data_ptr(), ptr);
        assert_eq!(moved.num_elements(), 3);
        assert_eq!(attr.num_elements(), 0);
        assert_eq!(attr.get_all().len(), 0);
        // Source is still usable
        attr.insert_elements(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(attr.num_elements(), 1);
    }

    #[test]
    fn clone_deep_copies_internal_buffers() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        attr.insert_elements(&iota(9)).unwrap();
        let copy = attr.clone();
        assert_ne!(copy.data_ptr(), attr.data_ptr());
        assert_eq!(copy.get_all(), attr.get_all());
    }

    #[test]
    fn clone_honors_copy_policy_for_external_buffers() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let mut buffer = iota(15);
        unsafe { attr.wrap(&mut buffer[..], 5).unwrap() };

        // Default: deep copy, clone becomes internal
        let copy = attr.try_clone().unwrap();
        assert!(!copy.is_external());
        assert_ne!(copy.data_ptr(), attr.data_ptr());
        assert_eq!(copy.get_all(), attr.get_all());

        attr.set_copy_policy(CopyPolicy::KeepExternalPtr);
        let alias = attr.try_clone().unwrap();
        assert!(alias.is_external());
        assert_eq!(alias.data_ptr(), attr.data_ptr());

        attr.set_copy_policy(CopyPolicy::ErrorIfExternal);
        assert!(attr.try_clone().is_err());
    }

    #[test]
    fn shared_wrap_is_managed() {
        use super::super::shared::SharedBuffer;

        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let shared = SharedBuffer::from_vec(iota(15));
        attr.wrap_shared(shared.clone(), 5).unwrap();
        assert!(attr.is_external());
        assert!(attr.is_managed());
        assert!(!attr.is_read_only());

        // The attribute holds the allocation alive after the original
        // handle is dropped.
        let ptr = attr.data_ptr();
        drop(shared);
        assert_eq!(attr.data_ptr(), ptr);
        assert_eq!(attr.get_at(4, 2), 14.0);
    }

    #[test]
    fn shared_const_wrap_is_read_only() {
        use super::super::shared::SharedBuffer;

        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let shared = SharedBuffer::from_vec(iota(15));
        attr.wrap_shared_const(shared, 5).unwrap();
        assert!(attr.is_read_only());
        assert!(attr.is_managed());
        assert!(attr.ref_all().is_err());
    }

    #[test]
    fn reserve_is_a_noop_within_external_capacity() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let mut buffer = iota(27);
        unsafe { attr.wrap(&mut buffer[..], 5).unwrap() };
        let ptr = attr.data_ptr();

        // Within the declared capacity even the strict policy accepts it
        attr.reserve_entries(20).unwrap();
        assert_eq!(attr.data_ptr(), ptr);
        assert!(attr.reserve_entries(28).is_err());

        attr.set_growth_policy(GrowthPolicy::SilentCopy);
        attr.reserve_entries(40).unwrap();
        assert!(!attr.is_external());
        assert!(attr.capacity() >= 40);
        assert_eq!(attr.get_all(), &iota(15)[..]);
    }
}
