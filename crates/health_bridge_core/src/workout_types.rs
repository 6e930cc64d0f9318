//! Normalized workout type tags.
//!
//! Both platforms identify activity types by numeric code. Codes are mapped
//! to lowerCamelCase tags; anything unmapped becomes `other`.

use crate::catalog::Platform;

pub const OTHER: &str = "other";

pub fn workout_type_tag(platform: Platform, code: u32) -> &'static str {
    let table = match platform {
        Platform::HealthConnect => HEALTH_CONNECT,
        Platform::HealthKit => HEALTHKIT,
    };
    table
        .binary_search_by_key(&code, |(c, _)| *c)
        .map(|i| table[i].1)
        .unwrap_or(OTHER)
}

// Sorted by code.
const HEALTH_CONNECT: &[(u32, &str)] = &[
    (0, "other"),
    (2, "badminton"),
    (4, "baseball"),
    (5, "basketball"),
    (8, "biking"),
    (9, "bikingStationary"),
    (10, "bootCamp"),
    (11, "boxing"),
    (13, "calisthenics"),
    (14, "cricket"),
    (16, "dancing"),
    (25, "elliptical"),
    (26, "exerciseClass"),
    (27, "fencing"),
    (28, "footballAmerican"),
    (29, "footballAustralian"),
    (31, "frisbeeDisc"),
    (32, "golf"),
    (33, "guidedBreathing"),
    (34, "gymnastics"),
    (35, "handball"),
    (36, "highIntensityIntervalTraining"),
    (37, "hiking"),
    (38, "iceHockey"),
    (39, "iceSkating"),
    (44, "martialArts"),
    (46, "paddling"),
    (47, "paragliding"),
    (48, "pilates"),
    (50, "racquetball"),
    (51, "rockClimbing"),
    (52, "rollerHockey"),
    (53, "rowing"),
    (54, "rowingMachine"),
    (55, "rugby"),
    (56, "running"),
    (57, "runningTreadmill"),
    (58, "sailing"),
    (59, "scubaDiving"),
    (60, "skating"),
    (61, "skiing"),
    (62, "snowboarding"),
    (63, "snowshoeing"),
    (64, "soccer"),
    (65, "softball"),
    (66, "squash"),
    (68, "stairClimbing"),
    (69, "stairClimbingMachine"),
    (70, "strengthTraining"),
    (71, "stretching"),
    (72, "surfing"),
    (73, "swimmingOpenWater"),
    (74, "swimmingPool"),
    (75, "tableTennis"),
    (76, "tennis"),
    (78, "volleyball"),
    (79, "walking"),
    (80, "waterPolo"),
    (81, "weightlifting"),
    (82, "wheelchair"),
    (83, "yoga"),
];

const HEALTHKIT: &[(u32, &str)] = &[
    (1, "americanFootball"),
    (2, "archery"),
    (3, "australianFootball"),
    (4, "badminton"),
    (5, "baseball"),
    (6, "basketball"),
    (7, "bowling"),
    (8, "boxing"),
    (9, "climbing"),
    (10, "cricket"),
    (11, "crossTraining"),
    (12, "curling"),
    (13, "cycling"),
    (14, "dance"),
    (15, "danceInspiredTraining"),
    (16, "elliptical"),
    (17, "equestrianSports"),
    (18, "fencing"),
    (19, "fishing"),
    (20, "functionalStrengthTraining"),
    (21, "golf"),
    (22, "gymnastics"),
    (23, "handball"),
    (24, "hiking"),
    (25, "hockey"),
    (26, "hunting"),
    (27, "lacrosse"),
    (28, "martialArts"),
    (29, "mindAndBody"),
    (30, "mixedMetabolicCardioTraining"),
    (31, "paddleSports"),
    (32, "play"),
    (33, "preparationAndRecovery"),
    (34, "racquetball"),
    (35, "rowing"),
    (36, "rugby"),
    (37, "running"),
    (38, "sailing"),
    (39, "skatingSports"),
    (40, "snowSports"),
    (41, "soccer"),
    (42, "softball"),
    (43, "squash"),
    (44, "stairClimbing"),
    (45, "surfingSports"),
    (46, "swimming"),
    (47, "tableTennis"),
    (48, "tennis"),
    (49, "trackAndField"),
    (50, "traditionalStrengthTraining"),
    (51, "volleyball"),
    (52, "walking"),
    (53, "waterFitness"),
    (54, "waterPolo"),
    (55, "waterSports"),
    (56, "wrestling"),
    (57, "yoga"),
    (58, "barre"),
    (59, "coreTraining"),
    (60, "crossCountrySkiing"),
    (61, "downhillSkiing"),
    (62, "flexibility"),
    (63, "highIntensityIntervalTraining"),
    (64, "jumpRope"),
    (65, "kickboxing"),
    (66, "pilates"),
    (67, "snowboarding"),
    (68, "stairs"),
    (69, "stepTraining"),
    (70, "wheelchairWalkPace"),
    (71, "wheelchairRunPace"),
    (72, "taiChi"),
    (73, "mixedCardio"),
    (74, "handCycling"),
    (75, "discSports"),
    (76, "fitnessGaming"),
    (77, "cardioDance"),
    (78, "socialDance"),
    (79, "pickleball"),
    (80, "cooldown"),
    (82, "swimBikeRun"),
    (83, "transition"),
    (84, "underwaterDiving"),
    (3000, "other"),
];
