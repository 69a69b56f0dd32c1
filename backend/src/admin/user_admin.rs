use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use library_platform_shared::{
    AdminAddUserForm, AdminChangeUserForm, DateFilterChoice, ERROR_USER_NOT_FOUND,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{field_label, Fieldset, ModelAdmin};
use crate::config::media_url;
use crate::error::AppError;
use crate::models::{Pagination, User};
use crate::services::UserManager;
use crate::utils::crypto::password_summary;
use crate::utils::validation::{clean_search_query, escape_html, escape_like, normalize_email};

pub const USER_ADMIN: ModelAdmin = ModelAdmin {
    model: "user",
    verbose_name: "User",
    verbose_name_plural: "Users",
    list_display: &[
        "email",
        "username",
        "first_name",
        "last_name",
        "date_of_birth",
        "is_staff",
        "is_active",
        "profile_photo_preview",
        "created_at",
    ],
    list_filter: &["is_active", "is_staff", "is_superuser", "created_at", "date_of_birth"],
    search_fields: &["email", "username", "first_name", "last_name"],
    ordering: &["-created_at"],
    fieldsets: &[
        Fieldset {
            name: Some("Account Information"),
            fields: &["email", "username", "password"],
            classes: &[],
        },
        Fieldset {
            name: Some("Personal Information"),
            fields: &["first_name", "last_name", "date_of_birth", "profile_photo"],
            classes: &[],
        },
        Fieldset {
            name: Some("Permissions"),
            fields: &["is_active", "is_staff", "is_superuser"],
            classes: &["collapse"],
        },
        Fieldset {
            name: Some("Important Dates"),
            fields: &["last_login", "created_at", "updated_at"],
            classes: &["collapse"],
        },
    ],
    add_fieldsets: &[
        Fieldset {
            name: None,
            fields: &["email", "username", "password1", "password2"],
            classes: &["wide"],
        },
        Fieldset {
            name: Some("Personal Information"),
            fields: &["first_name", "last_name", "date_of_birth", "profile_photo"],
            classes: &["wide"],
        },
        Fieldset {
            name: Some("Permissions"),
            fields: &["is_active", "is_staff", "is_superuser"],
            classes: &["wide"],
        },
    ],
    readonly_fields: &["created_at", "updated_at", "last_login"],
    computed_columns: &[("profile_photo_preview", "Photo")],
};

/// Query string of the user change list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub q: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub created_at: Option<DateFilterChoice>,
    pub date_of_birth: Option<DateFilterChoice>,
    /// Column to order by, `-` prefixed for descending.
    pub o: Option<String>,
    /// 1-based page number.
    pub p: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListColumn {
    pub field: &'static str,
    pub label: String,
    pub sortable: bool,
}

#[derive(Debug, Serialize)]
pub struct ChangeList {
    pub columns: Vec<ListColumn>,
    pub results: Vec<Map<String, Value>>,
    pub count: i64,
    pub page: i64,
    pub num_pages: i64,
    pub ordering: String,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: String,
    pub value: Value,
    pub readonly: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderedFieldset {
    pub name: Option<&'static str>,
    pub classes: &'static [&'static str],
    pub fields: Vec<FormField>,
}

#[derive(Debug, Serialize)]
pub struct AdminForm {
    pub id: Option<Uuid>,
    pub title: String,
    pub fieldsets: Vec<RenderedFieldset>,
}

/// The user admin: change list, add form and change form.
#[derive(Clone)]
pub struct UserAdmin {
    pool: SqlitePool,
    manager: UserManager,
    media_url: String,
    per_page: i64,
}

impl UserAdmin {
    pub fn new(pool: SqlitePool, manager: UserManager, media_url: String, per_page: i64) -> Self {
        Self {
            pool,
            manager,
            media_url,
            per_page: per_page.max(1),
        }
    }

    pub fn options(&self) -> &'static ModelAdmin {
        &USER_ADMIN
    }

    /// Search, filter, order and paginate users for the change list.
    pub async fn changelist(&self, query: &UserListQuery) -> Result<ChangeList, AppError> {
        let search = match query.q.as_deref() {
            Some(raw) => clean_search_query(raw)
                .map_err(|e| AppError::Validation(format!("q: {}", e.code)))?,
            None => None,
        };

        let ordering = query
            .o
            .clone()
            .unwrap_or_else(|| USER_ADMIN.default_ordering().to_string());
        let (order_column, descending) = parse_ordering(&ordering)?;

        let today = Utc::now().date_naive();

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count_query, query, search.as_deref(), today);
        let count: i64 = count_query.build_query_scalar().fetch_one(&self.pool).await?;

        let num_pages = ((count + self.per_page - 1) / self.per_page).max(1);
        let page = query.p.unwrap_or(1);
        if page < 1 || page > num_pages {
            return Err(AppError::NotFound(format!("Invalid page ({})", page)));
        }

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM users");
        push_filters(&mut select, query, search.as_deref(), today);
        select.push(" ORDER BY ");
        select.push(order_column);
        select.push(if descending { " DESC" } else { " ASC" });
        let window = Pagination::page(page, self.per_page);
        select.push(" LIMIT ");
        select.push_bind(window.limit);
        select.push(" OFFSET ");
        select.push_bind(window.offset);

        debug!(sql = select.sql(), "User change list query");
        let users: Vec<User> = select.build_query_as().fetch_all(&self.pool).await?;

        let columns = USER_ADMIN
            .list_display
            .iter()
            .map(|field| ListColumn {
                field: *field,
                label: USER_ADMIN.column_label(field),
                sortable: USER_ADMIN.is_sortable(field),
            })
            .collect();

        let results = users
            .iter()
            .map(|user| {
                let mut row = Map::new();
                row.insert("id".to_string(), json!(user.id));
                for field in USER_ADMIN.list_display {
                    row.insert(field.to_string(), self.field_value(user, field));
                }
                row
            })
            .collect();

        Ok(ChangeList {
            columns,
            results,
            count,
            page,
            num_pages,
            ordering,
            search,
        })
    }

    /// Empty add form.
    pub fn add_form(&self) -> AdminForm {
        let fieldsets = USER_ADMIN
            .add_fieldsets
            .iter()
            .map(|fieldset| RenderedFieldset {
                name: fieldset.name,
                classes: fieldset.classes,
                fields: fieldset
                    .fields
                    .iter()
                    .map(|field| FormField {
                        name: *field,
                        label: field_label(field),
                        value: add_form_default(field),
                        readonly: false,
                    })
                    .collect(),
            })
            .collect();

        AdminForm {
            id: None,
            title: format!("Add {}", USER_ADMIN.verbose_name.to_lowercase()),
            fieldsets,
        }
    }

    /// Change form populated from the stored user.
    pub async fn change_form(&self, user_id: Uuid) -> Result<AdminForm, AppError> {
        let user = self.get_user(user_id).await?;

        let fieldsets = USER_ADMIN
            .fieldsets
            .iter()
            .map(|fieldset| RenderedFieldset {
                name: fieldset.name,
                classes: fieldset.classes,
                fields: fieldset
                    .fields
                    .iter()
                    .map(|field| FormField {
                        name: *field,
                        label: field_label(field),
                        value: self.field_value(&user, field),
                        // The hash is never editable here; it is shown as a summary.
                        readonly: USER_ADMIN.is_readonly(field) || *field == "password",
                    })
                    .collect(),
            })
            .collect();

        Ok(AdminForm {
            id: Some(user.id),
            title: user.to_string(),
            fieldsets,
        })
    }

    /// Save the add form through the user manager.
    pub async fn add_user(&self, form: AdminAddUserForm) -> Result<User, AppError> {
        form.validate()?;
        let (email, password, mut fields) = form.into_fields();

        if fields.is_superuser == Some(true) {
            fields.is_staff = Some(true);
            fields.is_active = Some(true);
        }

        let user = self.manager.create_user(&email, Some(&password), fields).await?;
        info!(user_id = %user.id, "Admin added user");
        Ok(user)
    }

    /// Save the change form. Read-only fields and the password are untouched.
    pub async fn change_user(
        &self,
        user_id: Uuid,
        mut form: AdminChangeUserForm,
    ) -> Result<User, AppError> {
        form.email = normalize_email(&form.email);
        form.validate()?;

        if form.is_superuser {
            form.is_staff = true;
            form.is_active = true;
        }

        let user = User::update_from_admin(&self.pool, user_id, &form).await?;
        info!(user_id = %user.id, "Admin changed user");
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), AppError> {
        if !User::delete(&self.pool, user_id).await? {
            return Err(AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()));
        }

        info!(user_id = %user_id, "Admin deleted user");
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User, AppError> {
        User::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))
    }

    /// Thumbnail markup for the list view, or "No photo".
    pub fn profile_photo_preview(&self, user: &User) -> String {
        match user.profile_photo.as_deref().filter(|path| !path.is_empty()) {
            Some(path) => format!(
                "<img src=\"{}\" style=\"width: 50px; height: 50px; border-radius: 50%; object-fit: cover;\" />",
                escape_html(&media_url(&self.media_url, path))
            ),
            None => "No photo".to_string(),
        }
    }

    fn field_value(&self, user: &User, field: &str) -> Value {
        match field {
            "email" => json!(user.email),
            "username" => json!(user.username),
            "password" => json!(password_summary(&user.password)),
            "first_name" => json!(user.first_name),
            "last_name" => json!(user.last_name),
            "date_of_birth" => json!(user.date_of_birth),
            "profile_photo" => json!(user.profile_photo),
            "profile_photo_preview" => json!(self.profile_photo_preview(user)),
            "phone_number" => json!(user.phone_number),
            "bio" => json!(user.bio),
            "is_email_verified" => json!(user.is_email_verified),
            "is_staff" => json!(user.is_staff),
            "is_superuser" => json!(user.is_superuser),
            "is_active" => json!(user.is_active),
            "last_login" => json!(user.last_login),
            "date_joined" => json!(user.date_joined),
            "created_at" => json!(user.created_at),
            "updated_at" => json!(user.updated_at),
            _ => Value::Null,
        }
    }
}

fn add_form_default(field: &str) -> Value {
    match field {
        "is_active" => json!(true),
        "is_staff" | "is_superuser" => json!(false),
        "username" | "date_of_birth" | "profile_photo" => Value::Null,
        _ => json!(""),
    }
}

/// Split `-created_at` into (`created_at`, descending) after checking the
/// column may be sorted on.
fn parse_ordering(ordering: &str) -> Result<(&'static str, bool), AppError> {
    let (field, descending) = match ordering.strip_prefix('-') {
        Some(field) => (field, true),
        None => (ordering, false),
    };

    USER_ADMIN
        .list_display
        .iter()
        .find(|column| **column == field && USER_ADMIN.is_sortable(column))
        .map(|column| (*column, descending))
        .ok_or_else(|| AppError::Validation(format!("Cannot order by \"{}\"", field)))
}

/// Append the WHERE clause shared by the count and page queries.
fn push_filters(
    builder: &mut QueryBuilder<'_, Sqlite>,
    query: &UserListQuery,
    search: Option<&str>,
    today: NaiveDate,
) {
    let mut separator = " WHERE ";

    let flags = [
        ("is_active", query.is_active),
        ("is_staff", query.is_staff),
        ("is_superuser", query.is_superuser),
    ];
    for (column, value) in flags {
        if let Some(value) = value {
            builder.push(separator).push(column).push(" = ").push_bind(value);
            separator = " AND ";
        }
    }

    if let Some(choice) = query.created_at {
        builder.push(separator);
        separator = " AND ";
        match date_range(choice, today) {
            Some((start, end)) => {
                builder
                    .push("created_at >= ")
                    .push_bind(midnight_utc(start))
                    .push(" AND created_at < ")
                    .push_bind(midnight_utc(end));
            }
            None if choice == DateFilterChoice::NoDate => {
                builder.push("created_at IS NULL");
            }
            None => {
                builder.push("created_at IS NOT NULL");
            }
        }
    }

    if let Some(choice) = query.date_of_birth {
        builder.push(separator);
        separator = " AND ";
        match date_range(choice, today) {
            Some((start, end)) => {
                builder
                    .push("date_of_birth >= ")
                    .push_bind(start)
                    .push(" AND date_of_birth < ")
                    .push_bind(end);
            }
            None if choice == DateFilterChoice::NoDate => {
                builder.push("date_of_birth IS NULL");
            }
            None => {
                builder.push("date_of_birth IS NOT NULL");
            }
        }
    }

    // Every term must match at least one search field.
    if let Some(search) = search {
        for term in search.split_whitespace() {
            let pattern = format!("%{}%", escape_like(term));
            builder.push(separator).push("(");
            separator = " AND ";
            for (i, column) in USER_ADMIN.search_fields.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder
                    .push(*column)
                    .push(" LIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\'");
            }
            builder.push(")");
        }
    }
}

/// Half-open `[start, end)` day range for the dated filter choices.
fn date_range(choice: DateFilterChoice, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let tomorrow = today + Duration::days(1);
    match choice {
        DateFilterChoice::Today => Some((today, tomorrow)),
        DateFilterChoice::Past7Days => Some((today - Duration::days(7), tomorrow)),
        DateFilterChoice::ThisMonth => {
            let start = today.with_day(1)?;
            let end = if start.month() == 12 {
                NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)?
            } else {
                NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)?
            };
            Some((start, end))
        }
        DateFilterChoice::ThisYear => Some((
            NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
        )),
        DateFilterChoice::HasDate | DateFilterChoice::NoDate => None,
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
