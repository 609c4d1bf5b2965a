//! Database operations for categories.

use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    category::domain::{Category, CategoryId, CategoryKind, CategoryName, DEFAULT_CATEGORIES},
    user::UserID,
};

/// Initialize the category table.
///
/// Category names are unique per user, enforced both here and by an
/// application level check so the error message can carry the name.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            color TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(user_id, name)
        );",
    )?;

    Ok(())
}

/// Create a category and return it with its generated ID.
///
/// # Errors
/// Returns:
/// - [Error::DuplicateCategory] if the user already has a category with the
///   exact same name.
/// - [Error::SqlError] if another SQL related error occurred.
pub fn create_category(
    name: CategoryName,
    kind: CategoryKind,
    color: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let exists: i64 = connection.query_row(
        "SELECT COUNT(*) FROM category WHERE user_id = ?1 AND name = ?2",
        (user_id.as_i64(), name.as_ref()),
        |row| row.get(0),
    )?;

    if exists > 0 {
        return Err(Error::DuplicateCategory);
    }

    connection.execute(
        "INSERT INTO category (name, kind, color, user_id) VALUES (?1, ?2, ?3, ?4)",
        (name.as_ref(), kind.as_str(), color, user_id.as_i64()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        kind,
        color: color.to_string(),
        user_id,
    })
}

/// Retrieve all of the user's categories in creation order.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, color, user_id FROM category \
             WHERE user_id = :user_id ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the category does not exist or belongs to
/// another user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, color, user_id FROM category \
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(&[(":id", &category_id), (":user_id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Delete a category owned by `user_id`.
///
/// The category row is removed but transactions keep the (now dangling) name
/// string, so deletion is blocked while any transaction still references it.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the category does not exist or belongs to another
///   user.
/// - [Error::CategoryInUse] if at least one of the user's transactions
///   carries the category's name.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_category(category_id, user_id, connection)?;

    let references: i64 = connection.query_row(
        "SELECT COUNT(*) FROM \"transaction\" WHERE user_id = ?1 AND category = ?2",
        (user_id.as_i64(), category.name.as_ref()),
        |row| row.get(0),
    )?;

    if references > 0 {
        return Err(Error::CategoryInUse(category.name.to_string()));
    }

    connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    Ok(())
}

/// Insert the default categories for a freshly registered user.
pub fn seed_default_categories(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    for (name, kind, color) in DEFAULT_CATEGORIES {
        create_category(
            CategoryName::new_unchecked(name),
            kind,
            color,
            user_id,
            connection,
        )?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;

    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    let raw_kind: String = row.get(2)?;
    let kind = CategoryKind::from_db_str(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown category kind {raw_kind:?}").into(),
        )
    })?;

    let color = row.get(3)?;
    let user_id = UserID::new(row.get(4)?);

    Ok(Category {
        id,
        name,
        kind,
        color,
        user_id,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        Error,
        category::{
            CategoryKind, CategoryName,
            db::{create_category, delete_category, get_categories, get_category},
        },
        db::initialize,
        password::PasswordHash,
        transaction::create_transaction,
        user::{User, UserID, create_user},
    };

    fn create_database_and_insert_test_user() -> (Connection, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let user = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (connection, user)
    }

    #[test]
    fn create_category_succeeds() {
        let (connection, user) = create_database_and_insert_test_user();
        let name = CategoryName::new("Groceries").unwrap();

        let category = create_category(
            name.clone(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        )
        .unwrap();

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(category.kind, CategoryKind::Expense);
        assert_eq!(category.color, "#ef4444");
        assert_eq!(category.user_id, user.id);
    }

    #[test]
    fn create_category_fails_on_duplicate_name() {
        let (connection, user) = create_database_and_insert_test_user();
        let name = CategoryName::new("Groceries").unwrap();
        create_category(
            name.clone(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        )
        .unwrap();

        let result = create_category(name, CategoryKind::Income, "#22c55e", user.id, &connection);

        assert_eq!(result, Err(Error::DuplicateCategory));
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        let (connection, user) = create_database_and_insert_test_user();
        create_category(
            CategoryName::new("Groceries").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        )
        .unwrap();

        let result = create_category(
            CategoryName::new("groceries").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn same_name_allowed_for_different_users() {
        let (connection, user) = create_database_and_insert_test_user();
        let other_user = create_user(
            "bar@baz.qux",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();
        create_category(
            CategoryName::new("Groceries").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        )
        .unwrap();

        let result = create_category(
            CategoryName::new("Groceries").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            other_user.id,
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn get_categories_only_returns_own_categories() {
        let (connection, user) = create_database_and_insert_test_user();
        let other_user = create_user(
            "bar@baz.qux",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();
        create_category(
            CategoryName::new("Mine").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        )
        .unwrap();
        create_category(
            CategoryName::new("Theirs").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            other_user.id,
            &connection,
        )
        .unwrap();

        let categories = get_categories(user.id, &connection).unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Mine");
    }

    #[test]
    fn get_category_fails_for_other_users_category() {
        let (connection, user) = create_database_and_insert_test_user();
        let other_user = create_user(
            "bar@baz.qux",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();
        let category = create_category(
            CategoryName::new("Theirs").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            other_user.id,
            &connection,
        )
        .unwrap();

        let result = get_category(category.id, user.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_unreferenced_category_succeeds() {
        let (connection, user) = create_database_and_insert_test_user();
        let category = create_category(
            CategoryName::new("Groceries").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        )
        .unwrap();

        delete_category(category.id, user.id, &connection).unwrap();

        assert!(get_categories(user.id, &connection).unwrap().is_empty());
    }

    #[test]
    fn delete_referenced_category_fails() {
        let (connection, user) = create_database_and_insert_test_user();
        let category = create_category(
            CategoryName::new("Groceries").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        )
        .unwrap();
        create_transaction(
            12.5,
            "Groceries",
            Some("weekly shop"),
            OffsetDateTime::now_utc(),
            false,
            None,
            user.id,
            &connection,
        )
        .unwrap();

        let result = delete_category(category.id, user.id, &connection);

        assert_eq!(
            result,
            Err(Error::CategoryInUse("Groceries".to_string()))
        );
    }

    #[test]
    fn delete_fails_for_missing_category() {
        let (connection, user) = create_database_and_insert_test_user();

        let result = delete_category(1337, user.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_ignores_other_users_transactions() {
        // Another user's transaction with the same category name must not
        // block deletion.
        let (connection, user) = create_database_and_insert_test_user();
        let other_user = create_user(
            "bar@baz.qux",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();
        let category = create_category(
            CategoryName::new("Groceries").unwrap(),
            CategoryKind::Expense,
            "#ef4444",
            user.id,
            &connection,
        )
        .unwrap();
        create_transaction(
            12.5,
            "Groceries",
            None,
            OffsetDateTime::now_utc(),
            false,
            None,
            other_user.id,
            &connection,
        )
        .unwrap();

        let result = delete_category(category.id, user.id, &connection);

        assert!(result.is_ok());
    }

    fn unused_user_id() -> UserID {
        UserID::new(999)
    }

    #[test]
    fn get_categories_empty_for_unknown_user() {
        let (connection, _user) = create_database_and_insert_test_user();

        let categories = get_categories(unused_user_id(), &connection).unwrap();

        assert!(categories.is_empty());
    }
}
