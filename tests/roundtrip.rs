use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

use anyhow::{Context, Result, ensure};

use runpak::pak::{PakWriter, WriteOptions};
use runpak::{LocalFileReader, PakError, PakExtractor};

fn runpak(dir: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_runpak"))
        .args(args)
        .current_dir(dir)
        .output()
        .context("Couldn't run runpak")
}

fn write(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn list(dir: &Path, pak: &str) -> Result<Vec<String>> {
    let out = runpak(dir, &["list", pak])?;
    ensure!(out.status.success(), "list failed: {:?}", out);
    Ok(String::from_utf8(out.stdout)?
        .lines()
        .map(str::to_string)
        .collect())
}

#[test]
fn create_list_extract() -> Result<()> {
    let src = tempfile::tempdir()?;
    let dst = tempfile::tempdir()?;
    let work = tempfile::tempdir()?;
    let pak = work.path().join("test.pak");
    let pak_arg = pak.to_str().context("non-UTF-8 temp path")?;

    write(&src.path().join("a.txt"), b"abc")?;
    write(&src.path().join("empty"), b"")?;
    write(&src.path().join("sub/dir/file.txt"), b"0123456789")?;
    fs::create_dir_all(src.path().join("sub/nothing"))?;

    let out = runpak(src.path(), &["-q", "create", pak_arg, "."])?;
    ensure!(out.status.success(), "create failed: {:?}", out);

    let names = list(work.path(), pak_arg)?;
    assert_eq!(names, ["a.txt", "empty", "sub/dir/file.txt"]);
    // Listing is stable
    assert_eq!(list(work.path(), pak_arg)?, names);

    // Extraction must leave unrelated files alone
    write(&dst.path().join("sub/dir/keep.txt"), b"keep")?;
    // ...and overwrite ones it owns
    write(&dst.path().join("a.txt"), b"stale contents")?;

    let out = runpak(dst.path(), &["extract", pak_arg])?;
    ensure!(out.status.success(), "extract failed: {:?}", out);
    let stdout = String::from_utf8(out.stdout)?;
    assert!(stdout.contains("  extracting: sub/dir/file.txt"));

    assert_eq!(fs::read(dst.path().join("a.txt"))?, b"abc");
    assert_eq!(fs::read(dst.path().join("empty"))?, b"");
    assert_eq!(fs::read(dst.path().join("sub/dir/file.txt"))?, b"0123456789");
    assert_eq!(fs::read(dst.path().join("sub/dir/keep.txt"))?, b"keep");
    assert!(!dst.path().join("sub/nothing").exists());
    Ok(())
}

#[test]
fn extract_into_directory_and_pipe() -> Result<()> {
    let src = tempfile::tempdir()?;
    let work = tempfile::tempdir()?;
    write(&src.path().join("maps/base1.bsp"), b"bsp")?;

    let pak = work.path().join("out.pak");
    let pak_arg = pak.to_str().context("non-UTF-8 temp path")?;
    let out = runpak(src.path(), &["-q", "create", pak_arg, "maps"])?;
    ensure!(out.status.success(), "create failed: {:?}", out);

    let out = runpak(work.path(), &["extract", pak_arg, "-d", "unpacked"])?;
    ensure!(out.status.success(), "extract failed: {:?}", out);
    assert_eq!(
        fs::read(work.path().join("unpacked/maps/base1.bsp"))?,
        b"bsp"
    );

    let out = runpak(work.path(), &["extract", pak_arg, "-p"])?;
    ensure!(out.status.success(), "pipe failed: {:?}", out);
    assert_eq!(out.stdout, b"bsp");
    Ok(())
}

#[test]
fn pipe_keeps_markers_with_their_bodies() -> Result<()> {
    let work = tempfile::tempdir()?;
    write(&work.path().join("src/a.txt"), b"first\n")?;
    write(&work.path().join("src/b.txt"), b"second")?;
    write(&work.path().join("src/c/d.txt"), b"third\n")?;

    let out = runpak(work.path(), &["-q", "create", "three.pak", "src"])?;
    ensure!(out.status.success(), "create failed: {:?}", out);

    let out = runpak(work.path(), &["extract", "three.pak", "-p"])?;
    ensure!(out.status.success(), "pipe failed: {:?}", out);
    assert_eq!(
        String::from_utf8(out.stdout)?,
        "--- src/a.txt ---\nfirst\n--- src/b.txt ---\nsecond--- src/c/d.txt ---\nthird\n"
    );
    Ok(())
}

#[test]
fn create_into_the_source_directory_twice() -> Result<()> {
    let work = tempfile::tempdir()?;
    write(&work.path().join("a.txt"), b"abc")?;
    write(&work.path().join("maps/base1.bsp"), &[7u8; 4096])?;

    for _ in 0..2 {
        let out = runpak(work.path(), &["-q", "create", "out.pak", "."])?;
        ensure!(out.status.success(), "create failed: {:?}", out);
        assert_eq!(list(work.path(), "out.pak")?, ["a.txt", "maps/base1.bsp"]);
    }
    assert_eq!(
        fs::metadata(work.path().join("out.pak"))?.len(),
        12 + 3 + 4096 + 2 * 64
    );
    Ok(())
}

#[test]
fn long_names_are_truncated() -> Result<()> {
    let src = tempfile::tempdir()?;
    let work = tempfile::tempdir()?;
    let pak = work.path().join("long.pak");
    let pak_arg = pak.to_str().context("non-UTF-8 temp path")?;
    let long = "n".repeat(60);
    write(&src.path().join(&long), b"x")?;

    let out = runpak(src.path(), &["-q", "create", pak_arg, "."])?;
    ensure!(out.status.success(), "create failed: {:?}", out);
    assert_eq!(list(work.path(), pak_arg)?, ["n".repeat(55)]);

    let out = runpak(src.path(), &["create", "--strict-names", pak_arg, "."])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("longer than 55 bytes"));
    Ok(())
}

#[test]
fn failures_exit_nonzero() -> Result<()> {
    let work = tempfile::tempdir()?;
    write(&work.path().join("bogus.pak"), b"PK\x03\x04 definitely not a pak")?;

    let out = runpak(work.path(), &["list", "bogus.pak"])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid PAK archive"));

    let out = runpak(work.path(), &["list", "missing.pak"])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("No such file or directory"));

    let out = runpak(work.path(), &["create", "new.pak", "no-such-dir"])?;
    assert!(!out.status.success());
    Ok(())
}

#[tokio::test]
async fn offsets_of_written_archive() -> Result<()> {
    let work = tempfile::tempdir()?;
    let path = work.path().join("offsets.pak");

    let file = tokio::fs::File::create(&path).await?;
    let mut writer = PakWriter::new(file, WriteOptions::default()).await?;
    writer.append_bytes("A", b"abc").await?;
    writer.append_bytes("B", b"").await?;
    writer.append_bytes("C", b"0123456789").await?;
    writer.finish().await?;

    let reader = Arc::new(LocalFileReader::new(&path)?);
    let extractor = PakExtractor::open(reader).await?;
    let header = extractor.parser().header();
    assert_eq!(header.index_offset, 12 + 3 + 10);
    assert_eq!(header.index_length, 3 * 64);
    assert_eq!(fs::metadata(&path)?.len(), 12 + 13 + 3 * 64);

    let got: Vec<_> = extractor
        .index()
        .iter()
        .map(|e| (e.name.as_str(), e.offset, e.length))
        .collect();
    assert_eq!(got, [("A", 12, 3), ("B", 15, 0), ("C", 15, 10)]);

    let c = extractor.index().find("C").context("missing C")?;
    assert_eq!(extractor.extract_to_memory(c).await?, b"0123456789");
    Ok(())
}

#[tokio::test]
async fn bad_magic_and_missing_archive() -> Result<()> {
    let work = tempfile::tempdir()?;
    let path = work.path().join("bad.pak");
    fs::write(&path, [0u8; 64])?;

    let reader = Arc::new(LocalFileReader::new(&path)?);
    assert!(matches!(
        PakExtractor::open(reader).await,
        Err(PakError::InvalidFormat(_))
    ));

    let missing = work.path().join("missing.pak");
    assert!(matches!(
        LocalFileReader::new(&missing),
        Err(PakError::NotFound(p)) if p == missing
    ));
    Ok(())
}
