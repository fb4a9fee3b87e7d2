//! Curated catalog of common mechanics, targeters, conditions and triggers.

use crate::schema::{
    ConditionSchema, MechanicSchema, ParamType, ParameterSchema as P, SchemaSet, TargeterSchema, TriggerSchema,
};
use std::collections::BTreeMap;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn params(items: Vec<(&str, P)>) -> BTreeMap<String, P> {
    items.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn mechanic(name: &str, aliases: &[&str], category: &str, description: &str, parameters: Vec<(&str, P)>) -> MechanicSchema {
    MechanicSchema {
        name: name.to_string(),
        aliases: strings(aliases),
        category: category.to_string(),
        description: description.to_string(),
        parameters: params(parameters),
    }
}

fn targeter(name: &str, aliases: &[&str], category: &str, description: &str, options: Vec<(&str, P)>) -> TargeterSchema {
    TargeterSchema {
        name: name.to_string(),
        aliases: strings(aliases),
        category: category.to_string(),
        description: description.to_string(),
        options: params(options),
    }
}

fn condition(name: &str, aliases: &[&str], category: &str, description: &str, parameters: Vec<(&str, P)>) -> ConditionSchema {
    ConditionSchema {
        name: name.to_string(),
        aliases: strings(aliases),
        category: category.to_string(),
        description: description.to_string(),
        parameters: params(parameters),
    }
}

fn trigger(name: &str, category: &str, description: &str, value_type: Option<ParamType>) -> TriggerSchema {
    TriggerSchema {
        name: name.to_string(),
        aliases: Vec::new(),
        category: category.to_string(),
        description: description.to_string(),
        has_value: value_type.is_some(),
        value_type,
    }
}

fn radius(default: i64) -> P {
    P::number().default_value(default).min(0.0).alias("r").describe("Radius in blocks")
}

const POTION_TYPES: &[&str] = &[
    "SPEED", "SLOW", "FAST_DIGGING", "SLOW_DIGGING", "INCREASE_DAMAGE", "HEAL", "HARM", "JUMP", "CONFUSION",
    "REGENERATION", "DAMAGE_RESISTANCE", "FIRE_RESISTANCE", "WATER_BREATHING", "INVISIBILITY", "BLINDNESS",
    "NIGHT_VISION", "HUNGER", "WEAKNESS", "POISON", "WITHER", "GLOWING", "LEVITATION", "SLOW_FALLING",
];

/// Mechanics, led by `damage` so it ranks first among equal search scores.
pub fn mechanics() -> Vec<MechanicSchema> {
    vec![
        mechanic(
            "damage",
            &["d"],
            "Damage",
            "Deals damage to the target",
            vec![
                ("amount", P::number().required().min(0.0).alias("a").describe("Amount of damage")),
                ("type", P::string().alias("t").describe("Damage cause")),
                ("ignorearmor", P::boolean().default_value(false).alias("ia").describe("Bypass armor")),
                ("preventimmunity", P::boolean().default_value(false).alias("pi").describe("Skip no-damage ticks")),
                ("preventknockback", P::boolean().default_value(false).alias("pk").describe("Cancel knockback")),
            ],
        ),
        mechanic(
            "percentdamage",
            &["percentagedamage"],
            "Damage",
            "Deals damage as a fraction of the target's health",
            vec![
                ("percent", P::number().required().min(0.0).max(1.0).alias("p").describe("Fraction of health")),
                ("currenthealth", P::boolean().default_value(false).alias("ch").describe("Use current health")),
            ],
        ),
        mechanic(
            "heal",
            &["h"],
            "Healing",
            "Heals the target",
            vec![
                ("amount", P::number().required().min(0.0).alias("a").describe("Health restored")),
                ("overheal", P::boolean().default_value(false).alias("oh").describe("Allow exceeding max health")),
            ],
        ),
        mechanic(
            "healpercent",
            &["percentheal"],
            "Healing",
            "Heals a fraction of the target's max health",
            vec![("multiplier", P::number().required().min(0.0).alias("m").describe("Fraction of max health"))],
        ),
        mechanic(
            "skill",
            &["metaskill", "meta", "spell"],
            "Meta",
            "Runs a metaskill by name",
            vec![(
                "skill",
                P::string().required().alias("s").alias("spell").alias("metaskill").describe("Metaskill to run"),
            )],
        ),
        mechanic(
            "message",
            &["msg", "m"],
            "Communication",
            "Sends a chat message to the target",
            vec![("message", P::string().required().alias("m").alias("msg").describe("Message text"))],
        ),
        mechanic(
            "sendtitle",
            &["title"],
            "Communication",
            "Shows a title on the target's screen",
            vec![
                ("title", P::string().alias("t").describe("Main title")),
                ("subtitle", P::string().alias("st").describe("Subtitle")),
                ("duration", P::number().default_value(20).min(0.0).alias("d").describe("Ticks on screen")),
            ],
        ),
        mechanic(
            "effect:particles",
            &["particles", "e:p", "e:particles", "effect:particle"],
            "Effects",
            "Plays a particle effect at the target",
            vec![
                ("particle", P::string().default_value("reddust").alias("p").describe("Particle name")),
                ("amount", P::number().default_value(10).min(0.0).alias("a").describe("Particle count")),
                ("speed", P::number().default_value(0.0).min(0.0).alias("s").describe("Particle speed")),
                ("yoffset", P::number().default_value(0.0).alias("y").describe("Vertical offset")),
                ("hspread", P::number().default_value(0.0).min(0.0).alias("hs").describe("Horizontal spread")),
                ("vspread", P::number().default_value(0.0).min(0.0).alias("vs").describe("Vertical spread")),
            ],
        ),
        mechanic(
            "effect:sound",
            &["sound", "e:s", "e:sound"],
            "Effects",
            "Plays a sound at the target",
            vec![
                ("sound", P::string().required().alias("s").describe("Sound name")),
                ("volume", P::number().default_value(1.0).min(0.0).alias("v").describe("Volume")),
                ("pitch", P::number().default_value(1.0).min(0.0).max(2.0).alias("p").describe("Pitch")),
            ],
        ),
        mechanic(
            "effect:lightning",
            &["e:lightning"],
            "Effects",
            "Strikes harmless lightning at the target",
            vec![],
        ),
        mechanic(
            "lightning",
            &[],
            "Damage",
            "Strikes damaging lightning at the target",
            vec![("damage", P::number().min(0.0).alias("d").describe("Damage override"))],
        ),
        mechanic(
            "ignite",
            &[],
            "Damage",
            "Sets the target on fire",
            vec![("ticks", P::number().default_value(60).min(0.0).alias("t").describe("Burn duration in ticks"))],
        ),
        mechanic(
            "potion",
            &[],
            "Effects",
            "Applies a potion effect",
            vec![
                ("type", P::one_of(POTION_TYPES).required().alias("t").describe("Potion effect")),
                ("duration", P::number().default_value(100).min(0.0).alias("d").describe("Duration in ticks")),
                ("level", P::number().default_value(1).min(1.0).max(255.0).alias("lvl").alias("l").describe("Amplifier")),
                ("hasparticles", P::boolean().default_value(true).alias("p").describe("Show particles")),
            ],
        ),
        mechanic(
            "throw",
            &[],
            "Movement",
            "Throws the target away from the caster",
            vec![
                ("velocity", P::number().default_value(1).alias("v").describe("Horizontal force")),
                ("velocityy", P::number().default_value(1).alias("vy").describe("Vertical force")),
            ],
        ),
        mechanic(
            "leap",
            &[],
            "Movement",
            "Leaps the caster toward the target",
            vec![("velocity", P::number().default_value(100).min(0.0).alias("v").describe("Leap strength"))],
        ),
        mechanic(
            "pull",
            &[],
            "Movement",
            "Pulls the target toward the caster",
            vec![("velocity", P::number().default_value(1).alias("v").describe("Pull strength"))],
        ),
        mechanic(
            "teleport",
            &["tp"],
            "Movement",
            "Teleports the caster to the target",
            vec![("spreadh", P::number().default_value(0).min(0.0).alias("sh").describe("Horizontal spread"))],
        ),
        mechanic(
            "summon",
            &[],
            "Spawning",
            "Summons mobs at the target",
            vec![
                ("type", P::string().required().alias("mob").alias("m").alias("t").describe("Mob to summon")),
                ("amount", P::number().default_value(1).min(1.0).alias("a").describe("How many")),
                ("radius", P::number().default_value(0).min(0.0).alias("r").describe("Spawn radius")),
            ],
        ),
        mechanic(
            "command",
            &["cmd"],
            "Utility",
            "Runs a server command",
            vec![
                ("command", P::string().required().alias("c").alias("cmd").describe("Command line")),
                ("asop", P::boolean().default_value(false).alias("op").describe("Run as operator")),
                ("ascaster", P::boolean().default_value(false).alias("ac").describe("Run as the caster")),
            ],
        ),
        mechanic(
            "delay",
            &[],
            "Utility",
            "Pauses a metaskill for a number of ticks",
            vec![("ticks", P::number().required().min(0.0).alias("t").describe("Ticks to wait"))],
        ),
        mechanic(
            "signal",
            &[],
            "Utility",
            "Sends a signal that ~onSignal listeners receive",
            vec![("signal", P::string().required().alias("s").describe("Signal name"))],
        ),
        mechanic(
            "setspeed",
            &[],
            "Stats",
            "Changes the target's movement speed",
            vec![
                ("speed", P::number().default_value(1).min(0.0).alias("s").describe("New speed")),
                ("type", P::one_of(&["WALKING", "FLYING"]).default_value("WALKING").alias("t").describe("Speed kind")),
            ],
        ),
        mechanic(
            "aura",
            &["buff", "debuff"],
            "Auras",
            "Applies a named aura to the target",
            vec![
                ("auraname", P::string().alias("aura").alias("b").alias("buffname").describe("Aura name")),
                ("duration", P::number().default_value(200).min(0.0).alias("d").alias("ticks").describe("Duration in ticks")),
                ("charges", P::number().default_value(0).min(0.0).alias("c").describe("Charges before expiring")),
            ],
        ),
        mechanic(
            "projectile",
            &["p"],
            "Projectiles",
            "Fires a projectile that can run metaskills on hit",
            vec![
                ("onhitskill", P::string().alias("onhit").alias("oh").describe("Metaskill run on hit")),
                ("ontickskill", P::string().alias("ontick").alias("ot").describe("Metaskill run each tick")),
                ("velocity", P::number().default_value(5).min(0.0).alias("v").describe("Speed")),
                ("maxrange", P::number().default_value(40).min(0.0).alias("mr").describe("Range in blocks")),
                ("hitconditions", P::list().alias("conditions").describe("Conditions applied to hit targets")),
            ],
        ),
    ]
}

pub fn targeters() -> Vec<TargeterSchema> {
    vec![
        targeter("self", &["caster", "boss", "mob"], "Single", "The caster itself", vec![]),
        targeter("target", &["t"], "Single", "The caster's current target", vec![]),
        targeter("trigger", &[], "Single", "The entity that fired the trigger", vec![]),
        targeter(
            "nearestPlayer",
            &[],
            "Single",
            "The closest player within a radius",
            vec![("radius", radius(64))],
        ),
        targeter(
            "PIR",
            &["playersInRadius"],
            "Area",
            "Players within a radius",
            vec![("radius", radius(5))],
        ),
        targeter(
            "EIR",
            &["entitiesInRadius"],
            "Area",
            "Entities within a radius",
            vec![
                ("radius", radius(5)),
                ("type", P::string().alias("t").describe("Entity type filter")),
            ],
        ),
        targeter(
            "MIR",
            &["mobsInRadius"],
            "Area",
            "Mobs within a radius",
            vec![
                ("radius", radius(5)),
                ("types", P::string().alias("type").alias("t").describe("Mob types")),
            ],
        ),
        targeter(
            "LIR",
            &["livingInRadius"],
            "Area",
            "Living entities within a radius",
            vec![
                ("radius", radius(5)),
                ("conditions", P::list().alias("c").describe("Target conditions")),
            ],
        ),
        targeter("selflocation", &["casterlocation"], "Location", "The caster's location", vec![]),
        targeter("targetlocation", &["targetloc", "TL"], "Location", "The target's location", vec![]),
        targeter(
            "forward",
            &[],
            "Location",
            "A point in front of the caster",
            vec![
                ("forward", P::number().default_value(5).alias("f").describe("Distance ahead")),
                ("sideoffset", P::number().default_value(0).alias("so").describe("Sideways offset")),
                ("yoffset", P::number().default_value(0).alias("y").describe("Vertical offset")),
            ],
        ),
        targeter(
            "randomlocationInRadius",
            &["RLIR"],
            "Location",
            "Random locations around the caster",
            vec![
                ("radius", radius(5)),
                ("minradius", P::number().default_value(0).min(0.0).alias("min").describe("Minimum distance")),
                ("amount", P::number().default_value(1).min(1.0).alias("a").describe("Locations to pick")),
            ],
        ),
    ]
}

pub fn conditions() -> Vec<ConditionSchema> {
    let value = |desc: &str| P::string().alias("v").describe(desc);
    vec![
        condition("health", &["hp"], "Entity", "Health within a range", vec![("value", value("Health range"))]),
        condition(
            "healthpercent",
            &["hppercent"],
            "Entity",
            "Health percentage within a range",
            vec![("value", P::number().min(0.0).max(100.0).alias("v").describe("Percentage"))],
        ),
        condition("incombat", &[], "Entity", "Whether the caster is in combat", vec![]),
        condition("distance", &["d"], "Location", "Distance to the target", vec![("value", value("Distance range"))]),
        condition("day", &[], "Time", "It is day in the caster's world", vec![]),
        condition("night", &[], "Time", "It is night in the caster's world", vec![]),
        condition("raining", &[], "World", "It is raining", vec![]),
        condition("thundering", &[], "World", "It is thundering", vec![]),
        condition("biome", &[], "World", "The caster stands in one of the biomes", vec![("value", value("Biome list"))]),
        condition("world", &["w"], "World", "The caster is in one of the worlds", vec![("value", value("World list"))]),
        condition(
            "hasaura",
            &[],
            "Entity",
            "The target has the named aura",
            vec![("aura", P::string().alias("a").alias("name").describe("Aura name"))],
        ),
        condition(
            "haspotioneffect",
            &["haspotion"],
            "Entity",
            "The target has the potion effect",
            vec![("type", P::one_of(POTION_TYPES).alias("t").describe("Potion effect"))],
        ),
        condition(
            "lightlevel",
            &["ll"],
            "Location",
            "Light level at the caster",
            vec![("value", P::number().min(0.0).max(15.0).alias("v").describe("Light level"))],
        ),
        condition("height", &["y"], "Location", "The caster's height", vec![("value", value("Height range"))]),
        condition("mobtype", &["entitytype"], "Entity", "The target's entity type", vec![("value", value("Entity types"))]),
        condition(
            "mythicmobtype",
            &["mmtype"],
            "Entity",
            "The target's custom mob type",
            vec![("value", value("Mob internal names"))],
        ),
        condition("isburning", &["onfire"], "Entity", "The target is on fire", vec![]),
        condition("lineofsight", &["los"], "Entity", "The caster can see the target", vec![]),
        condition(
            "playerwithin",
            &["pw"],
            "Location",
            "A player is within the distance",
            vec![("value", P::number().min(0.0).alias("v").describe("Distance"))],
        ),
        condition("level", &["l"], "Entity", "The caster's level", vec![("value", value("Level range"))]),
    ]
}

pub fn triggers() -> Vec<TriggerSchema> {
    let plain = |name: &str, category: &str, description: &str| trigger(name, category, description, None);
    vec![
        plain("onSpawn", "Lifecycle", "When the mob spawns"),
        plain("onFirstSpawn", "Lifecycle", "When the mob spawns for the first time"),
        plain("onLoad", "Lifecycle", "When the mob is loaded"),
        plain("onDeath", "Lifecycle", "When the mob dies"),
        plain("onDespawn", "Lifecycle", "When the mob despawns"),
        plain("onChunkUnload", "Lifecycle", "When the mob's chunk unloads"),
        plain("onAttack", "Combat", "When the mob attacks"),
        plain("onDamaged", "Combat", "When the mob takes damage"),
        plain("onCombat", "Combat", "On attack or on damaged"),
        plain("onEnterCombat", "Combat", "When the mob enters combat"),
        plain("onDropCombat", "Combat", "When the mob leaves combat"),
        plain("onChangeTarget", "Combat", "When the mob switches target"),
        plain("onKill", "Combat", "When the mob kills an entity"),
        plain("onKillPlayer", "Combat", "When the mob kills a player"),
        plain("onPlayerDeath", "Combat", "When a nearby player dies"),
        plain("onTargetInRange", "Combat", "When the target comes into range"),
        plain("onTargetOutOfRange", "Combat", "When the target leaves range"),
        plain("onExplode", "Combat", "When the mob explodes"),
        plain("onPrime", "Combat", "When a creeper primes"),
        plain("onShoot", "Projectile", "When the mob shoots"),
        plain("onBowHit", "Projectile", "When the mob's arrow hits"),
        plain("onProjectileHit", "Projectile", "When a projectile hits"),
        plain("onProjectileLaunch", "Projectile", "When a projectile launches"),
        trigger("onTimer", "Timed", "Every N ticks", Some(ParamType::Number)),
        trigger("onSignal", "Signal", "When a named signal is received", Some(ParamType::String)),
        plain("onAnySkill", "Signal", "When any skill runs"),
        plain("onInteract", "Player", "When a player right-clicks the mob"),
        plain("onCreativePunch", "Player", "When a creative player punches the mob"),
        plain("onSwing", "Player", "When the holder swings"),
        plain("onBlock", "Player", "When the holder blocks"),
        plain("onCrouch", "Player", "When the holder crouches"),
        plain("onUncrouch", "Player", "When the holder stands up"),
        plain("onJump", "Player", "When the holder jumps"),
        plain("onUse", "Item", "When the item is used"),
        plain("onConsume", "Item", "When the item is consumed"),
        plain("onEquip", "Item", "When the item is equipped"),
        plain("onUnequip", "Item", "When the item is unequipped"),
        plain("onPickup", "Item", "When the item is picked up"),
        plain("onDrop", "Item", "When the item is dropped"),
        plain("onReady", "Item", "When the holder readies"),
        plain("onTeleport", "Movement", "When the mob teleports"),
        plain("onChangeWorld", "Movement", "When the mob changes world"),
        plain("onMount", "Movement", "When the mob is mounted"),
        plain("onDismount", "Movement", "When the mob is dismounted"),
        plain("onBreed", "Animal", "When the mob breeds"),
        plain("onTame", "Animal", "When the mob is tamed"),
    ]
}

pub fn schema_set() -> SchemaSet {
    SchemaSet {
        mechanics: mechanics(),
        targeters: targeters(),
        conditions: conditions(),
        triggers: triggers(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HasParameters, SchemaRegistry};

    #[test]
    fn names_are_unique_per_kind() {
        fn check(names: Vec<String>) {
            let mut seen = std::collections::HashSet::new();
            for n in names {
                assert!(seen.insert(n.to_ascii_lowercase()), "duplicate name {n}");
            }
        }
        check(mechanics().into_iter().map(|m| m.name).collect());
        check(targeters().into_iter().map(|t| t.name).collect());
        check(conditions().into_iter().map(|c| c.name).collect());
        check(triggers().into_iter().map(|t| t.name).collect());
    }

    #[test]
    fn skill_mechanic_accepts_every_name_key() {
        let reg = SchemaRegistry::builtin();
        let skill = reg.mechanic("skill").expect("skill");
        for key in ["s", "skill", "spell", "metaskill"] {
            assert_eq!(skill.parameter(key).map(|(n, _)| n), Some("skill"), "key {key}");
        }
    }

    #[test]
    fn value_triggers_declare_value_type() {
        for t in triggers() {
            assert_eq!(t.has_value, t.value_type.is_some(), "{}", t.name);
        }
        let reg = SchemaRegistry::builtin();
        assert!(reg.trigger("onTimer").is_some_and(|t| t.has_value));
        assert!(reg.trigger("onAttack").is_some_and(|t| !t.has_value));
    }

    #[test]
    fn builtin_resolves_common_aliases() {
        let reg = SchemaRegistry::builtin();
        assert_eq!(reg.mechanic("e:p").map(|m| m.name.as_str()), Some("effect:particles"));
        assert_eq!(reg.targeter("@playersInRadius").map(|t| t.name.as_str()), Some("PIR"));
        assert_eq!(reg.condition("hp").map(|c| c.name.as_str()), Some("health"));
    }
}
