/// Dense index into one of the arenas of a [`Network`](crate::network::Network) or
/// [`MipModel`](crate::model::MipModel).
pub trait Idx: Copy + Eq + Ord + std::hash::Hash {
    type Raw;
    fn new(i: usize) -> Self;
    fn index(self) -> usize;
    fn raw(&self) -> Self::Raw;
}

#[macro_export(local_inner_macros)]
macro_rules! _impl_define_idx_type {
    ($name:ident, $type:ty) => {
        #[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, Ord, PartialOrd)]
        pub struct $name($type);

        impl crate::Idx for $name {
            type Raw = $type;

            #[inline(always)]
            fn new(i: usize) -> Self {
                ::core::debug_assert!(i <= <$type>::MAX as usize);
                return Self(i as $type)
            }

            #[inline(always)]
            fn index(self) -> usize {
                return self.0 as usize
            }

            fn raw(&self) -> Self::Raw {
                return self.0
            }
        }
    }
}

#[macro_export]
macro_rules! define_u32_idx_type { ($name:ident) => { _impl_define_idx_type!{$name, u32} } }

/// Hands out consecutive indices.
pub(crate) fn range<I: Idx>(n: usize) -> impl Iterator<Item=I> + Clone {
    (0..n).map(I::new)
}
