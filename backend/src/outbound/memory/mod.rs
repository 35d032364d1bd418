//! In-memory repositories.
//!
//! Used when no database URL is configured and by the HTTP integration tests.
//! Each repository guards its tables with a single mutex; lock poisoning is
//! recovered from because every critical section leaves the maps consistent.
//! Ordering and filtering mirror the Diesel adapters: newest first, ties
//! broken by id, filters applied through the domain `matches` helpers.

mod contacts;
mod images;
mod todos;
mod users;

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use uuid::Uuid;

pub use contacts::{InMemoryAddressRepository, InMemoryContactRepository};
pub use images::InMemoryImageRepository;
pub use todos::InMemoryTodoRepository;
pub use users::InMemoryUserRepository;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sort newest first and cut out the requested page.
fn paginate<T, K>(mut items: Vec<T>, page: PageRequest, key: K) -> Page<T>
where
    K: Fn(&T) -> (DateTime<Utc>, Uuid),
{
    items.sort_by(|a, b| {
        let (a_at, a_id) = key(a);
        let (b_at, b_id) = key(b);
        b_at.cmp(&a_at).then(a_id.cmp(&b_id))
    });
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let window = items.into_iter().skip(offset).take(limit).collect();
    Page::new(window, page, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn paginate_orders_newest_first_and_counts_everything() {
        let items: Vec<(DateTime<Utc>, Uuid)> =
            (0..25).map(|minute| (at(minute), Uuid::new_v4())).collect();
        let page = paginate(
            items,
            PageRequest::new(3, 10).expect("valid page"),
            |item| *item,
        );

        assert_eq!(page.paging.total_item, 25);
        assert_eq!(page.paging.total_page, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].0, at(4));
    }

    #[rstest]
    fn paginate_past_the_end_is_empty() {
        let items = vec![(at(0), Uuid::nil())];
        let page = paginate(items, PageRequest::new(2, 10).expect("valid page"), |i| *i);
        assert!(page.items.is_empty());
        assert_eq!(page.paging.total_item, 1);
    }
}
