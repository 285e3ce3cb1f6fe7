//! Mapped and literal variants against a file-backed database.

use std::collections::HashSet;

use bookshelf_common::{AuthorId, BookId};
use bookshelf_db::catalog::{self, Approach, QueryArgs, QueryShape};
use bookshelf_db::models::{BookUpdate, NewBook};
use bookshelf_db::pool::{open_database, DbConfig, DbPool};
use bookshelf_db::queries::{books, literal, mapped};
use tempfile::TempDir;

fn seeded_database() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_database(&DbConfig::at(dir.path().join("books.db"))).unwrap();
    (dir, pool)
}

fn with_reprint(pool: &DbPool) {
    books::create_book(pool, &NewBook::new("Book Two", "A reprint", AuthorId::from(1))).unwrap();
}

#[test]
fn every_shape_agrees() {
    let (_dir, pool) = seeded_database();

    for shape in QueryShape::ALL {
        let args = QueryArgs::default();
        let a = catalog::run(&pool, shape, Approach::Mapped, args).unwrap();
        let b = catalog::run(&pool, shape, Approach::Literal, args).unwrap();

        if shape.is_ordered() {
            assert_eq!(a, b, "{shape}");
        } else {
            assert_eq!(a.sorted(), b.sorted(), "{shape}");
        }
    }
}

#[test]
fn ordered_by_title_matches_row_for_row() {
    let (_dir, pool) = seeded_database();
    let a = mapped::books_by_title(&pool).unwrap();
    let b = literal::books_by_title(&pool).unwrap();
    assert_eq!(a, b);

    let titles: Vec<_> = a.iter().map(|b| b.title.clone()).collect();
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);
}

#[test]
fn fetch_by_id_round_trips_created_book() {
    let (_dir, pool) = seeded_database();
    let created = books::create_book(
        &pool,
        &NewBook::new("Book Five", "Summary of Book Five", AuthorId::from(1)),
    )
    .unwrap();

    assert_eq!(mapped::fetch_by_id(&pool, created.id).unwrap(), Some(created.clone()));
    assert_eq!(literal::fetch_by_id(&pool, created.id).unwrap(), Some(created));
}

#[test]
fn limit_is_a_subset_of_fetch_all() {
    let (_dir, pool) = seeded_database();
    let all = literal::fetch_all(&pool).unwrap();

    for variant in [mapped::first_books, literal::first_books] {
        let first = variant(&pool, 2).unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|b| all.contains(b)));
    }
}

#[test]
fn having_is_a_subset_of_group_by() {
    let (_dir, pool) = seeded_database();
    books::create_book(&pool, &NewBook::new("Solo", "Only one", AuthorId::from(1))).unwrap();

    let grouped: HashSet<_> = mapped::books_per_author(&pool).unwrap().into_iter().collect();
    let having = literal::authors_with_multiple_books(&pool).unwrap();

    assert!(having.iter().all(|row| row.book_count > 1));
    assert!(having.iter().all(|row| grouped.contains(row)));
}

#[test]
fn union_contains_each_value_once() {
    let (_dir, pool) = seeded_database();
    books::create_book(&pool, &NewBook::new("Author One", "Same as a name", AuthorId::from(1)))
        .unwrap();

    let values = mapped::titles_and_names(&pool).unwrap();
    let unique: HashSet<_> = values.iter().collect();
    assert_eq!(values.len(), unique.len());
    assert_eq!(values.len(), 6);
}

#[test]
fn joins_and_subquery_cover_authors() {
    let (_dir, pool) = seeded_database();

    let mut plain = mapped::books_with_authors(&pool).unwrap();
    let mut aliased = literal::books_with_author_alias(&pool).unwrap();
    plain.sort_by(|a, b| a.title.cmp(&b.title));
    aliased.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(plain, aliased);
    assert_eq!(plain.len(), 4);

    let counts = mapped::book_counts_by_subquery(&pool).unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts.iter().map(|c| c.book_count).sum::<i64>(), 4);
}

#[test]
fn update_is_visible_to_both_variants() {
    let (_dir, pool) = seeded_database();
    let updated = books::update_book(
        &pool,
        BookId::from(1),
        &BookUpdate::default().summary("A new summary"),
    )
    .unwrap()
    .unwrap();

    assert_eq!(updated.title, "Book One");
    assert_eq!(literal::fetch_by_id(&pool, BookId::from(1)).unwrap(), Some(updated.clone()));
    assert_eq!(mapped::fetch_by_id(&pool, BookId::from(1)).unwrap(), Some(updated));
}

#[test]
fn reopening_does_not_reseed() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::at(dir.path().join("books.db"));

    {
        let pool = open_database(&config).unwrap();
        books::create_book(&pool, &NewBook::new("Kept", "Survives reopen", AuthorId::from(2)))
            .unwrap();
    }

    let pool = open_database(&config).unwrap();
    assert_eq!(literal::fetch_all(&pool).unwrap().len(), 5);
}

#[test]
fn every_shape_agrees_with_duplicate_titles() {
    let (_dir, pool) = seeded_database();
    with_reprint(&pool);

    for shape in QueryShape::ALL {
        catalog::compare(&pool, shape, QueryArgs::default()).unwrap();
    }
}

#[test]
fn group_counts_sum_to_book_total() {
    let (_dir, pool) = seeded_database();
    with_reprint(&pool);
    let total = literal::fetch_all(&pool).unwrap().len() as i64;
    assert_eq!(total, 5);

    for variant in [mapped::books_per_author, literal::books_per_author] {
        let counts = variant(&pool).unwrap();
        assert_eq!(counts.iter().map(|c| c.book_count).sum::<i64>(), total);
    }
}

#[test]
fn ordered_by_title_is_a_permutation_of_fetch_all() {
    let (_dir, pool) = seeded_database();
    with_reprint(&pool);

    let mut all = mapped::fetch_all(&pool).unwrap();
    all.sort_by_key(|b| b.id);

    for variant in [mapped::books_by_title, literal::books_by_title] {
        let mut ordered = variant(&pool).unwrap();
        ordered.sort_by_key(|b| b.id);
        assert_eq!(ordered, all);
    }
}

#[test]
fn row_numbers_are_one_through_n() {
    let (_dir, pool) = seeded_database();
    with_reprint(&pool);

    for variant in [mapped::titles_with_row_number, literal::titles_with_row_number] {
        let mut ranks: Vec<_> = variant(&pool).unwrap().into_iter().map(|r| r.rank).collect();
        ranks.sort();
        assert_eq!(ranks, (1..=5).collect::<Vec<i64>>());
    }
}
