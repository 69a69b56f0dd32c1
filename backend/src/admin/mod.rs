//! Declarative admin screens.
//!
//! A [`ModelAdmin`] lists which columns a change list shows, which fields can
//! be filtered and searched, and how the add/change forms group fields. The
//! per-model admin (see [`user_admin`]) turns that metadata into queries and
//! rendered forms.

pub mod user_admin;

pub use user_admin::{UserAdmin, UserListQuery, USER_ADMIN};

use serde::Serialize;

/// A named group of fields shown together in a form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Fieldset {
    pub name: Option<&'static str>,
    pub fields: &'static [&'static str],
    pub classes: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelAdmin {
    pub model: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub ordering: &'static [&'static str],
    pub fieldsets: &'static [Fieldset],
    pub add_fieldsets: &'static [Fieldset],
    pub readonly_fields: &'static [&'static str],
    /// Computed list columns with their header text. They are not sortable.
    pub computed_columns: &'static [(&'static str, &'static str)],
}

impl ModelAdmin {
    pub fn is_readonly(&self, field: &str) -> bool {
        self.readonly_fields.contains(&field)
    }

    pub fn is_filterable(&self, field: &str) -> bool {
        self.list_filter.contains(&field)
    }

    /// Only stored list columns can be sorted on.
    pub fn is_sortable(&self, field: &str) -> bool {
        self.list_display.contains(&field)
            && !self.computed_columns.iter().any(|(name, _)| *name == field)
    }

    pub fn column_label(&self, field: &str) -> String {
        self.computed_columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| field_label(field))
    }

    pub fn default_ordering(&self) -> &'static str {
        self.ordering.first().copied().unwrap_or("-id")
    }
}

/// Display label for a model field.
pub fn field_label(field: &str) -> String {
    let label = match field {
        "email" => "Email Address",
        "date_of_birth" => "Date of Birth",
        "profile_photo" => "Profile Photo",
        "phone_number" => "Phone Number",
        "bio" => "Biography",
        "is_email_verified" => "Email Verified",
        "created_at" => "Created At",
        "updated_at" => "Updated At",
        "is_staff" => "Staff status",
        "is_active" => "Active",
        "is_superuser" => "Superuser status",
        "password1" => "Password",
        "password2" => "Password confirmation",
        other => return humanize(other),
    };
    label.to_string()
}

/// `first_name` -> `First name`
fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
