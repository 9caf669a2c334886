//! Forum index and category listing pages.

use std::collections::HashSet;

use maud::{html, Markup};

use crate::components::{
    BaseLayout, EmptyState, Form, Input, Select, SelectOption, TagBadge, ThreadCard,
};
use crate::db::{Category, Tag, ThreadFilter, ThreadSort, ThreadView, User};

/// Render the forum index: every category with its description.
#[must_use]
pub fn render_forum_index(categories: &[Category], user: Option<&User>) -> Markup {
    let content = html! {
        h1 { "Forum" }
        @if categories.is_empty() {
            (EmptyState::new("No categories yet."))
        }
        div class="category-list" {
            @for category in categories {
                article class="category-card" {
                    h3 {
                        a href=(format!("/forum/{}", category.slug())) { (category.name) }
                    }
                    p { (category.description) }
                }
            }
        }
    };

    BaseLayout::new("Forum", user).render(content)
}

/// Parameters for the category listing page.
#[derive(Debug)]
pub struct CategoryPageParams<'a> {
    pub category: &'a Category,
    pub threads: &'a [ThreadView],
    pub filter: &'a ThreadFilter,
    pub all_tags: &'a [Tag],
    pub user: Option<&'a User>,
    /// Thread ids the viewer has liked.
    pub liked: &'a HashSet<i64>,
    /// Thread ids the viewer has bookmarked.
    pub bookmarked: &'a HashSet<i64>,
}

/// Render a category's thread listing with filter and sort controls.
#[must_use]
pub fn render_category_page(params: &CategoryPageParams<'_>) -> Markup {
    let category = params.category;
    let slug = category.slug();

    let content = html! {
        nav class="breadcrumb" {
            a href="/forum" { "Forum" }
            " / "
            (category.name)
        }
        h1 { (category.name) }
        p class="category-description" { (category.description) }

        @if params.user.is_some() {
            p {
                a role="button" href=(format!("/forum/new-thread?category={slug}")) {
                    "New Thread"
                }
            }
        }

        (filter_controls(&slug, category, params.filter, params.all_tags))

        @if !params.filter.tags.is_empty() {
            p class="active-filters" {
                "Filtering by: "
                @for tag in &params.filter.tags {
                    (TagBadge::new(tag))
                    " "
                }
                a href=(format!("/forum/{slug}")) { "clear" }
            }
        }

        @if params.threads.is_empty() {
            (EmptyState::new("No threads match. Start the conversation!"))
        }
        div class="thread-list" {
            @for thread in params.threads {
                @let card = ThreadCard::new(thread);
                @if params.user.is_some() {
                    (card.with_viewer(
                        params.liked.contains(&thread.id),
                        params.bookmarked.contains(&thread.id),
                    ))
                } @else {
                    (card)
                }
            }
        }
    };

    BaseLayout::new(&category.name, params.user).render(content)
}

/// Search, tag, and sort controls submitting back to the listing as a GET.
fn filter_controls(
    slug: &str,
    category: &Category,
    filter: &ThreadFilter,
    all_tags: &[Tag],
) -> Markup {
    let tags_value = filter.tags.join(",");
    let search_value = filter.title_search.clone().unwrap_or_default();

    let sort_options: Vec<SelectOption> = sorts_for(category)
        .iter()
        .map(|sort| SelectOption::new(sort.as_str(), sort.label()).selected(*sort == filter.sort))
        .collect();

    let form_content = html! {
        div class="filter-row" {
            (Input::text("search")
                .value(&search_value)
                .placeholder("Search titles"))
            (Input::text("tags")
                .value(&tags_value)
                .placeholder("Tags, comma separated")
                .id("tags-filter"))
            (Select::new("sort", sort_options).submit_on_change())
            button type="submit" { "Apply" }
        }
        datalist id="known-tags" {
            @for tag in all_tags {
                option value=(tag.name) {}
            }
        }
    };

    let action = format!("/forum/{slug}");
    let form = Form::get(&action, form_content).class("filter-form");
    html! { (form) }
}

/// Sorts offered for a category. Price ordering only makes sense in the
/// Marketplace.
fn sorts_for(category: &Category) -> Vec<ThreadSort> {
    let mut sorts = vec![ThreadSort::Newest, ThreadSort::Oldest, ThreadSort::MostLiked];
    if category.is_marketplace() {
        sorts.push(ThreadSort::PriceAsc);
        sorts.push(ThreadSort::PriceDesc);
    }
    sorts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        Category {
            id: 1,
            name: name.to_string(),
            description: "desc".to_string(),
            display_order: 1,
        }
    }

    #[test]
    fn test_price_sorts_only_in_marketplace() {
        assert!(sorts_for(&category("Marketplace")).contains(&ThreadSort::PriceAsc));
        assert!(!sorts_for(&category("General Discussion")).contains(&ThreadSort::PriceAsc));
    }

    #[test]
    fn test_index_lists_categories() {
        let categories = vec![category("General Discussion")];
        let html = render_forum_index(&categories, None).into_string();
        assert!(html.contains("href=\"/forum/general-discussion\""));
        assert!(html.contains("General Discussion"));
    }

    #[test]
    fn test_category_page_hides_new_thread_for_anonymous() {
        let cat = category("Game Reviews");
        let params = CategoryPageParams {
            category: &cat,
            threads: &[],
            filter: &ThreadFilter::default(),
            all_tags: &[],
            user: None,
            liked: &HashSet::new(),
            bookmarked: &HashSet::new(),
        };
        let html = render_category_page(&params).into_string();
        assert!(!html.contains("New Thread"));
        assert!(html.contains("No threads match"));
    }
}
