use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool() -> Result<DbPool, Box<dyn std::error::Error>> {
    let manager = SqliteConnectionManager::file("website/db/feedframe.db");
    let pool = Pool::builder().max_size(10).build(manager)?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Aggregated social posts (one row per post, media as JSON array)
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            platform TEXT NOT NULL,
            author TEXT NOT NULL,
            avatar TEXT,
            content TEXT NOT NULL DEFAULT '',
            media_json TEXT NOT NULL DEFAULT '[]',
            likes INTEGER NOT NULL DEFAULT 0,
            comments INTEGER NOT NULL DEFAULT 0,
            posted_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_posts_platform ON posts(platform);
        CREATE INDEX IF NOT EXISTS idx_posts_posted_at ON posts(posted_at);

        -- Saved widgets (declarative config as one JSON column)
        CREATE TABLE IF NOT EXISTS widgets (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            config_json TEXT NOT NULL DEFAULT '{}',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Prebuilt widget templates
        CREATE TABLE IF NOT EXISTS widget_templates (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT 'general',
            featured INTEGER NOT NULL DEFAULT 0,
            config_json TEXT NOT NULL DEFAULT '{}',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );
        ",
    )?;

    Ok(())
}

pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let defaults = vec![
        // General
        ("site_name", "Feedframe"),
        ("site_url", "http://localhost:8000"),
        ("default_theme", "minimal"),
        ("default_layout", "grid"),
        ("max_posts_per_widget", "50"),
        ("date_format", "%B %d, %Y"),
        // Embed
        ("embed_base_url", "http://localhost:8000"),
        // Platform API credentials (blank until configured)
        ("api_twitter_key", ""),
        ("api_instagram_key", ""),
        ("api_facebook_key", ""),
        ("api_youtube_key", ""),
        ("api_linkedin_key", ""),
        ("api_cache_enabled", "true"),
        ("api_cache_expiration_secs", "3600"),
        // Notifications
        ("notify_email", "true"),
        ("notify_widget_updates", "true"),
        ("notify_system_alerts", "true"),
        ("notify_weekly_reports", "false"),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    seed_sample_posts(pool)?;
    seed_starter_templates(pool)?;

    Ok(())
}

/// A realistic sample feed so a fresh install previews something.
/// Only runs against an empty posts table.
fn seed_sample_posts(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let samples: &[(&str, &str, &str, &str, i64, i64, &str)] = &[
        (
            "twitter",
            "TechStartup",
            "Excited to announce our new AI-powered feature! 🚀 This will revolutionize how teams collaborate. #innovation #AI #startup",
            r#"["https://images.unsplash.com/photo-1677442136019-21780ecad995?w=400"]"#,
            1247,
            89,
            "2023-12-15 10:30:00",
        ),
        (
            "instagram",
            "CreativeAgency",
            "Behind the scenes of our latest campaign shoot ✨ The team worked incredibly hard to bring this vision to life! #creative #campaign #teamwork",
            r#"["https://images.unsplash.com/photo-1611224923853-80b023f02d71?w=400"]"#,
            2156,
            134,
            "2023-12-15 08:15:00",
        ),
        (
            "facebook",
            "LocalBusiness",
            "Thank you to everyone who visited our booth this weekend! We loved meeting the community. #local #community",
            "[]",
            412,
            58,
            "2023-12-14 17:05:00",
        ),
        (
            "linkedin",
            "Sarah Chen",
            "Just finished an amazing conference on digital transformation. Key takeaway: The future belongs to companies that embrace change. #conference #digitaltransformation #leadership",
            r#"["https://images.unsplash.com/photo-1540575467063-178a50c2df87?w=400"]"#,
            543,
            32,
            "2023-12-14 14:20:00",
        ),
        (
            "youtube",
            "MakerChannel",
            "New video is live! We tear down the latest e-ink reader and rebuild it better. #teardown #diy #electronics",
            r#"["https://images.unsplash.com/photo-1518770660439-4636190af475?w=400"]"#,
            8211,
            640,
            "2023-12-14 09:00:00",
        ),
        (
            "instagram",
            "FoodieCorner",
            "Fresh ingredients, bold flavors, happy customers! 🍕 What's your favorite pizza topping? #food #pizza #fresh #local",
            r#"["https://images.unsplash.com/photo-1565299624946-b28f40a0ca4b?w=400"]"#,
            1834,
            201,
            "2023-12-13 19:30:00",
        ),
        (
            "twitter",
            "StartupNews",
            "BREAKING: Another unicorn startup emerges from the fintech space! 🦄 The industry continues to evolve at breakneck speed. #fintech #startup #unicorn #news",
            "[]",
            1923,
            156,
            "2023-12-13 11:20:00",
        ),
        (
            "tiktok",
            "CreativeContent",
            "Quick design tip: Use the rule of thirds to create more visually appealing layouts! ✨ Save this for later! #design #tips #creative",
            r#"["https://images.unsplash.com/photo-1586717799252-bd134ad00e26?w=400"]"#,
            5432,
            321,
            "2023-12-10 10:45:00",
        ),
        (
            "linkedin",
            "GrowthLabs",
            "We are hiring! Three open roles on the data team. If you love messy datasets and clean dashboards, come talk to us. #hiring #data",
            "[]",
            287,
            41,
            "2023-12-09 15:10:00",
        ),
        (
            "facebook",
            "CityEvents",
            "The winter market opens this Friday — 40 local vendors, live music, and hot cider. See you there! #winterfest #events",
            r#"["https://images.unsplash.com/photo-1512389142860-9c449e58a543?w=400"]"#,
            964,
            112,
            "2023-12-08 12:00:00",
        ),
    ];

    for (platform, author, content, media, likes, comments, posted_at) in samples {
        conn.execute(
            "INSERT INTO posts (platform, author, content, media_json, likes, comments, posted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![platform, author, content, media, likes, comments, posted_at],
        )?;
    }

    Ok(())
}

/// Starter templates for the gallery. Only runs against an empty table.
fn seed_starter_templates(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM widget_templates", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let templates: &[(&str, &str, &str, &str, i64, &str)] = &[
        (
            "Product Launch Wall",
            "product-launch-wall",
            "Grid of launch-day mentions across Twitter and LinkedIn.",
            "marketing",
            1,
            r#"{"platforms":["twitter","linkedin"],"filters":[{"type":"hashtag","value":"launch","platform":"all","mode":"include"}],"layout":"grid","theme":"card","max_posts":12,"grid":{"columns":"3","gap":"md"}}"#,
        ),
        (
            "Testimonial Masonry",
            "testimonial-masonry",
            "Masonry wall of customer shout-outs, text front and center.",
            "social-proof",
            1,
            r#"{"platforms":[],"filters":[{"type":"keyword","value":"love","platform":"all","mode":"include"}],"layout":"masonry","theme":"minimal","max_posts":20,"masonry":{"columns":"3"}}"#,
        ),
        (
            "Event Hashtag Slider",
            "event-hashtag-slider",
            "Auto-playing slider for a live event hashtag.",
            "events",
            0,
            r#"{"platforms":["twitter","instagram","tiktok"],"filters":[{"type":"hashtag","value":"winterfest","platform":"all","mode":"include"}],"layout":"slider","theme":"magazine","max_posts":15,"slider":{"autoplay":true,"autoplay_delay_ms":4000}}"#,
        ),
        (
            "Team Updates Sidebar",
            "team-updates-sidebar",
            "Compact LinkedIn list for a careers or about page.",
            "company",
            0,
            r#"{"platforms":["linkedin"],"filters":[],"layout":"list","theme":"compact","max_posts":5,"list":{"compact_mode":true,"show_dividers":true}}"#,
        ),
    ];

    for (name, slug, description, category, featured, config) in templates {
        conn.execute(
            "INSERT INTO widget_templates (name, slug, description, category, featured, config_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![name, slug, description, category, featured, config],
        )?;
    }

    Ok(())
}
