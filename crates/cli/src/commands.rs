//! Execution of the client commands against a [`LibraryApi`].

use std::io::Write;

use anyhow::{bail, Context};
use libris_catalog::{
    paginate, Book, BookPatch, CopyAction, CopyCounts, CopyReconciler, LibraryApi, LibraryStats,
    NewBook, Notification, Notifier, Outcome,
};
use uuid::Uuid;

use crate::cli::{AddArgs, ClearField, Command, EditArgs};

/// Prints reconciler notifications to stderr.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => eprintln!("ok: {message}"),
            Notification::Failure(message) => eprintln!("error: {message}"),
        }
    }
}

/// Terminal side effects a command may need.
pub struct Console<'a, W: Write> {
    pub out: W,
    pub notifier: &'a dyn Notifier,
    /// Asks a yes/no question; `Ok(true)` to proceed
    pub confirm: &'a mut dyn FnMut(&str) -> anyhow::Result<bool>,
}

pub async fn execute<A, W>(api: &A, command: Command, console: &mut Console<'_, W>) -> anyhow::Result<()>
where
    A: LibraryApi,
    W: Write,
{
    match command {
        Command::Serve => bail!("serve is handled by the binary entrypoint"),
        Command::List(args) => {
            let books = api.list_books().await.context("failed to list books")?;
            if books.is_empty() {
                writeln!(console.out, "No books in the catalog.")?;
                return Ok(());
            }

            let books = args.filter().apply(books);
            if books.is_empty() {
                writeln!(console.out, "No books match.")?;
                return Ok(());
            }

            match args.page {
                Some(page) => {
                    let page = paginate(books, to_usize(page), to_usize(args.per_page));
                    for book in &page.items {
                        writeln!(console.out, "{}", summary_line(book))?;
                    }
                    writeln!(
                        console.out,
                        "Page {} of {} ({} books)",
                        page.page, page.total_pages, page.total_items
                    )?;
                }
                None => {
                    for book in &books {
                        writeln!(console.out, "{}", summary_line(book))?;
                    }
                }
            }
        }
        Command::Show { id } => {
            let book = api.get_book(id).await.context("failed to fetch book")?;
            write_details(&mut console.out, &book)?;
        }
        Command::Stats => {
            let stats = api.stats().await.context("failed to fetch statistics")?;
            write_stats(&mut console.out, &stats)?;
        }
        Command::Add(args) => {
            let book = api
                .create_book(&new_book(args))
                .await
                .context("failed to add book")?;
            writeln!(console.out, "Added {}", summary_line(&book))?;
        }
        Command::Edit(args) => {
            let (id, patch) = edit_patch(args);
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            let book = api
                .update_book(id, &patch)
                .await
                .context("failed to update book")?;
            writeln!(console.out, "Updated {}", summary_line(&book))?;
        }
        Command::Delete { id } => {
            api.delete_book(id).await.context("failed to delete book")?;
            writeln!(console.out, "Deleted {id}")?;
        }
        Command::Increment { id, yes } => increment(api, id, yes, console).await?,
        Command::Decrement { id } => decrement(api, id, console).await?,
    }

    Ok(())
}

async fn increment<A, W>(
    api: &A,
    id: Uuid,
    assume_yes: bool,
    console: &mut Console<'_, W>,
) -> anyhow::Result<()>
where
    A: LibraryApi,
    W: Write,
{
    let book = api.get_book(id).await.context("failed to fetch book")?;
    let mut reconciler = CopyReconciler::new(&book);

    let mut outcome = reconciler
        .dispatch(CopyAction::Increment, api, console.notifier)
        .await;

    if let Outcome::NeedsConfirmation(proposed) = outcome {
        let question = format!(
            "All {} copies of \"{}\" are already available. Add a new copy (total {})?",
            book.total_copies, book.title, proposed.total
        );
        let action = if assume_yes || (console.confirm)(&question)? {
            CopyAction::Confirm
        } else {
            CopyAction::Cancel
        };
        outcome = reconciler.dispatch(action, api, console.notifier).await;
    }

    report(outcome, console)
}

async fn decrement<A, W>(api: &A, id: Uuid, console: &mut Console<'_, W>) -> anyhow::Result<()>
where
    A: LibraryApi,
    W: Write,
{
    let book = api.get_book(id).await.context("failed to fetch book")?;
    let mut reconciler = CopyReconciler::new(&book);

    if !reconciler.can_decrement() {
        writeln!(console.out, "No available copies of \"{}\" to check out.", book.title)?;
        return Ok(());
    }

    let outcome = reconciler
        .dispatch(CopyAction::Decrement, api, console.notifier)
        .await;
    report(outcome, console)
}

fn report<W: Write>(outcome: Outcome, console: &mut Console<'_, W>) -> anyhow::Result<()> {
    match outcome {
        Outcome::Committed(counts) => {
            writeln!(console.out, "Copies: {}", format_counts(counts))?;
            Ok(())
        }
        Outcome::Cancelled => {
            writeln!(console.out, "Cancelled; copies unchanged.")?;
            Ok(())
        }
        Outcome::Unchanged | Outcome::NeedsConfirmation(_) => Ok(()),
        Outcome::Reverted { restored, error } => Err(anyhow::Error::new(error).context(format!(
            "copy update reverted; copies remain {}",
            format_counts(restored)
        ))),
    }
}

fn new_book(args: AddArgs) -> NewBook {
    NewBook {
        title: args.title,
        author: args.author,
        series: args.series,
        publisher: args.publisher,
        genre: args.genre,
        language: args.language,
        year_published: args.year,
        total_copies: args.copies,
        available_copies: args.available,
        price: args.price,
    }
}

fn edit_patch(args: EditArgs) -> (Uuid, BookPatch) {
    let cleared = |field: ClearField| args.clear.contains(&field);
    let nullable = |value: Option<String>, field: ClearField| {
        if cleared(field) {
            Some(None)
        } else {
            value.map(Some)
        }
    };

    let patch = BookPatch {
        title: args.title.clone(),
        author: args.author.clone(),
        series: nullable(args.series.clone(), ClearField::Series),
        publisher: nullable(args.publisher.clone(), ClearField::Publisher),
        genre: nullable(args.genre.clone(), ClearField::Genre),
        language: nullable(args.language.clone(), ClearField::Language),
        year_published: if cleared(ClearField::Year) {
            Some(None)
        } else {
            args.year.map(Some)
        },
        total_copies: args.copies,
        available_copies: args.available,
        price: if cleared(ClearField::Price) {
            Some(None)
        } else {
            args.price.map(Some)
        },
    };
    (args.id, patch)
}

fn format_counts(counts: CopyCounts) -> String {
    format!("{}/{} available", counts.available, counts.total)
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn summary_line(book: &Book) -> String {
    format!(
        "{}  {} by {}  [{}]",
        book.id,
        book.title,
        book.author,
        format_counts(book.counts())
    )
}

fn write_details<W: Write>(out: &mut W, book: &Book) -> std::io::Result<()> {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    writeln!(out, "ID:         {}", book.id)?;
    writeln!(out, "Title:      {}", book.title)?;
    writeln!(out, "Author:     {}", book.author)?;
    writeln!(out, "Series:     {}", optional(&book.series))?;
    writeln!(out, "Publisher:  {}", optional(&book.publisher))?;
    writeln!(out, "Genre:      {}", optional(&book.genre))?;
    writeln!(out, "Language:   {}", optional(&book.language))?;
    writeln!(
        out,
        "Year:       {}",
        book.year_published
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string())
    )?;
    writeln!(out, "Copies:     {}", format_counts(book.counts()))?;
    writeln!(
        out,
        "Price:      {}",
        book.price
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".to_string())
    )?;
    writeln!(out, "Added:      {}", book.created_at)?;
    writeln!(out, "Updated:    {}", book.updated_at)
}

fn write_stats<W: Write>(out: &mut W, stats: &LibraryStats) -> std::io::Result<()> {
    writeln!(out, "Books:            {}", stats.total_books)?;
    writeln!(out, "Total copies:     {}", stats.total_copies)?;
    writeln!(out, "Available copies: {}", stats.available_copies)?;
    writeln!(
        out,
        "Top genre:        {}",
        stats.top_genre.as_deref().unwrap_or("-")
    )?;
    writeln!(out, "Added (30 days):  {}", stats.recent_additions)
}
